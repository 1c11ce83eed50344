//! Pass-through adapter for data already in canonical form.
//!
//! Used to re-ingest normalized output and simulator output. Values are not
//! converted; metadata is rebuilt from the `standard_name`/`units` attributes
//! stored in the file, falling back to the canonical table.

use std::path::Path;

use alcf_common::{canonical, AlcfError, AlcfResult, Dataset, VariableMeta};
use netcdf_parser::ArrayStore;

use super::{InstrumentDescriptor, LidarReader};
use crate::source_error;

static DESCRIPTOR: InstrumentDescriptor = InstrumentDescriptor {
    key: "cosp",
    name: "Canonical / simulated lidar output",
    wavelength_nm: 1064,
    calibration_coeff: 1.0,
    sc_lidar_ratio: None,
    surface: true,
};

/// Pass-through adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosp;

impl LidarReader for Cosp {
    fn descriptor(&self) -> &'static InstrumentDescriptor {
        &DESCRIPTOR
    }

    fn dependencies(&self) -> &'static [(&'static str, &'static [&'static str])] {
        &[]
    }

    /// Every requested variable is its own native field.
    fn native_fields<'a>(&self, requested: &[&'a str]) -> Vec<&'a str> {
        requested.to_vec()
    }

    fn read(
        &self,
        store: &dyn ArrayStore,
        path: &Path,
        variables: &[&str],
    ) -> AlcfResult<Dataset> {
        let context = format!("{} ({})", path.display(), DESCRIPTOR.key);
        let mut raw = store
            .read(path, &self.native_fields(variables))
            .map_err(|e| source_error(e, DESCRIPTOR.key))?;

        for &name in variables {
            let dims = raw.require(name, &context)?.dims.clone();
            let spec = canonical(name);
            let standard_name = raw
                .attribute(name, "standard_name")
                .or(spec.map(|s| s.standard_name));
            let units = raw.attribute(name, "units").or(spec.map(|s| s.units));

            let (standard_name, units) = match (standard_name, units) {
                (Some(s), Some(u)) => (s.to_string(), u.to_string()),
                _ => {
                    return Err(AlcfError::format(
                        &context,
                        format!("no standard_name/units for variable '{}'", name),
                    ))
                }
            };

            raw.meta.insert(
                name.to_string(),
                VariableMeta {
                    dims,
                    standard_name,
                    units,
                },
            );
        }

        let out = raw.select(variables);
        out.validate()?;
        Ok(out)
    }
}
