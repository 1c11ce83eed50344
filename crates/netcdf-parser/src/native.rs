//! Native NetCDF access using the netcdf library.
//!
//! Reads only the requested variables of a file as `f64`, whatever their
//! stored type, together with their string attributes. Writes canonical
//! datasets with one NetCDF dimension per named axis.

use std::path::{Path, PathBuf};
use std::sync::Once;

use alcf_common::{Array, Attributes, Dataset};
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::{list_files, stored_attributes, stored_dims, ArrayStore};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist).
///
/// This function disables that output by calling H5Eset_auto2 with null handlers.
/// It only needs to be called once per process, but is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// NetCDF files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetcdfStore;

impl NetcdfStore {
    pub fn new() -> Self {
        silence_hdf5_errors();
        Self
    }
}

impl ArrayStore for NetcdfStore {
    fn list(&self, dir: &Path) -> NetCdfResult<Vec<PathBuf>> {
        list_files(dir)
    }

    fn read(&self, path: &Path, variables: &[&str]) -> NetCdfResult<Dataset> {
        let file = netcdf::open(path)?;
        let mut out = Dataset::new();

        for &name in variables {
            let var = file
                .variable(name)
                .ok_or_else(|| NetCdfError::MissingVariable {
                    path: path.display().to_string(),
                    name: name.to_string(),
                })?;

            let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
            let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
            let data: Vec<f64> = var.get_values(..)?;
            let array = Array::new(dims, shape, data).map_err(|e| {
                NetCdfError::InvalidFormat(format!("{}: {}: {}", path.display(), name, e))
            })?;

            let attrs = string_attributes(&var);
            if !attrs.is_empty() {
                out.attributes.insert(name.to_string(), attrs);
            }
            out.insert(name, array);
        }

        debug!(path = %path.display(), variables = ?variables, "Read NetCDF variables");
        Ok(out)
    }

    fn write(&self, path: &Path, dataset: &Dataset) -> NetCdfResult<()> {
        let mut file = netcdf::create(path)?;

        for (name, array) in &dataset.variables {
            let dims = stored_dims(dataset, name);
            for (dim, &len) in dims.iter().zip(&array.shape) {
                let existing = file.dimension(dim).map(|d| d.len());
                match existing {
                    Some(existing) if existing != len => {
                        return Err(NetCdfError::InvalidFormat(format!(
                            "{}: dimension '{}' has length {} but '{}' needs {}",
                            path.display(),
                            dim,
                            existing,
                            name,
                            len
                        )));
                    }
                    Some(_) => {}
                    None => {
                        file.add_dimension(dim, len)?;
                    }
                }
            }

            let dim_refs: Vec<&str> = dims.iter().map(String::as_str).collect();
            let mut var = file.add_variable::<f64>(name, &dim_refs)?;
            var.put_values(&array.data, ..)?;
            for (key, value) in stored_attributes(dataset, name) {
                var.put_attribute(&key, value.as_str())?;
            }
        }

        debug!(path = %path.display(), variables = dataset.variables.len(), "Wrote NetCDF file");
        Ok(())
    }
}

/// String-valued attributes of a variable.
fn string_attributes(var: &netcdf::Variable) -> Attributes {
    let mut attrs = Attributes::new();
    for attr in var.attributes() {
        if let Ok(netcdf::AttributeValue::Str(value)) = attr.value() {
            attrs.insert(attr.name().to_string(), value);
        }
    }
    attrs
}
