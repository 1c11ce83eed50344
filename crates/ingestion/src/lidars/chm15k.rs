//! Lufft CHM 15k ceilometer.
//!
//! Native fields:
//!
//! - `time`: seconds since 1904-01-01 00:00 UTC
//! - `beta_raw`: (time, range) raw backscatter in digitizer counts
//! - `range`: range gate distance from the instrument (m)
//! - `altitude`: instrument altitude above sea level (m)
//!
//! Conversions:
//!
//! - `time = t / 86400 + 2416480.5` (Julian day)
//! - `backscatter = beta_raw * 1e-11 * 0.2` (m-1 sr-1)
//! - `zfull[t, k] = range[k] + altitude`, repeated for every profile

use std::path::Path;

use alcf_common::time::julian_from_epoch_seconds;
use alcf_common::{AlcfError, AlcfResult, Array, Dataset};
use netcdf_parser::ArrayStore;
use tracing::debug;

use super::{InstrumentDescriptor, LidarReader};
use crate::source_error;

/// Julian day of 1904-01-01T00:00:00Z, the CHM 15k time origin.
pub const TIME_OFFSET: f64 = 2416480.5;

/// The CHM 15k time origin in seconds relative to the Unix epoch.
const UNIX_OFFSET_SECONDS: f64 = -2_082_844_800.0;

/// Scale from digitizer counts to m-1 sr-1 before calibration.
pub const BETA_RAW_SCALE: f64 = 1e-11;

static DESCRIPTOR: InstrumentDescriptor = InstrumentDescriptor {
    key: "chm15k",
    name: "Lufft CHM 15k",
    wavelength_nm: 1064,
    calibration_coeff: 0.2,
    // O'Connor et al. (2004)
    sc_lidar_ratio: Some(18.2),
    surface: true,
};

static DEPENDENCIES: &[(&str, &[&str])] = &[
    ("backscatter", &["beta_raw"]),
    ("time", &["time"]),
    ("zfull", &["range", "altitude", "time"]),
];

/// CHM 15k adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chm15k;

impl LidarReader for Chm15k {
    fn descriptor(&self) -> &'static InstrumentDescriptor {
        &DESCRIPTOR
    }

    fn dependencies(&self) -> &'static [(&'static str, &'static [&'static str])] {
        DEPENDENCIES
    }

    fn read(
        &self,
        store: &dyn ArrayStore,
        path: &Path,
        variables: &[&str],
    ) -> AlcfResult<Dataset> {
        let context = format!("{} ({})", path.display(), DESCRIPTOR.key);
        let fields = self.native_fields(variables);
        let raw = store
            .read(path, &fields)
            .map_err(|e| source_error(e, DESCRIPTOR.key))?;

        let mut out = Dataset::new();
        for &name in variables {
            match name {
                "time" => {
                    let time = raw.require("time", &context)?;
                    out.insert_canonical("time", Array::from_vec("time", julian_time(&time.data)))?;
                }
                "backscatter" => {
                    let beta_raw = raw.require("beta_raw", &context)?;
                    out.insert_canonical("backscatter", backscatter(beta_raw, &context)?)?;
                }
                "zfull" => {
                    let n = raw.require("time", &context)?.len();
                    let range = raw.require("range", &context)?;
                    let altitude = raw.require("altitude", &context)?;
                    out.insert_canonical("zfull", zfull(n, range, altitude, &context)?)?;
                }
                other => {
                    debug!(variable = other, lidar = DESCRIPTOR.key, "Ignoring unsupported variable");
                }
            }
        }

        out.validate()?;
        Ok(out)
    }
}

fn julian_time(seconds: &[f64]) -> Vec<f64> {
    seconds
        .iter()
        .map(|&s| julian_from_epoch_seconds(s, UNIX_OFFSET_SECONDS))
        .collect()
}

fn backscatter(beta_raw: &Array, context: &str) -> AlcfResult<Array> {
    if beta_raw.ndim() != 2 {
        return Err(AlcfError::format(
            context,
            format!("beta_raw must be (time, range), got shape {:?}", beta_raw.shape),
        ));
    }
    let scale = BETA_RAW_SCALE * DESCRIPTOR.calibration_coeff;
    let data = beta_raw.data.iter().map(|b| b * scale).collect();
    Array::new(
        vec!["time".to_string(), "level".to_string()],
        beta_raw.shape.clone(),
        data,
    )
}

fn zfull(n: usize, range: &Array, altitude: &Array, context: &str) -> AlcfResult<Array> {
    if range.ndim() != 1 {
        return Err(AlcfError::format(
            context,
            format!("range must be one-dimensional, got shape {:?}", range.shape),
        ));
    }
    let altitude = altitude.as_scalar().ok_or_else(|| {
        AlcfError::format(
            context,
            format!("altitude must be a single value, got shape {:?}", altitude.shape),
        )
    })?;

    let profile: Vec<f64> = range.data.iter().map(|r| r + altitude).collect();
    let m = profile.len();
    let data = profile.iter().copied().cycle().take(n * m).collect();
    Array::from_rows(["time", "level"], n, m, data)
}
