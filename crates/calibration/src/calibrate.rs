//! Calibration coefficient from lidar-ratio samples.

use std::fmt;
use std::fs;
use std::path::Path;

use alcf_common::{period_mask, AlcfError, AlcfResult, TimePeriod};
use ingestion::LidarType;
use netcdf_parser::ArrayStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::stats::median;

/// Result of a calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub lidar: LidarType,
    /// Laser wavelength (nm)
    pub wavelength: u32,
    pub calibration_coeff: f64,
    /// Median lidar ratio over all selected samples (sr)
    pub lr_median: f64,
    /// Number of samples the median was taken over
    pub samples: usize,
}

impl CalibrationRecord {
    /// Write the record as a single line, replacing any existing file.
    pub fn write_record(&self, path: &Path) -> AlcfResult<()> {
        fs::write(path, format!("{}\n", self))?;
        info!(path = %path.display(), "Wrote calibration record");
        Ok(())
    }

    pub fn to_json(&self) -> AlcfResult<String> {
        serde_json::to_string(self).map_err(|e| AlcfError::format("calibration record", e.to_string()))
    }
}

impl fmt::Display for CalibrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lidar: {} wavelength: {} calibration_coeff: {:.6} lr_median: {:.6}",
            self.lidar, self.wavelength, self.calibration_coeff, self.lr_median
        )
    }
}

/// Calibrate `lidar` from the normalized files in `input_dir`.
///
/// Every file must hold `time` and `lr`. Samples whose time falls in any of
/// `periods` are pooled across files; non-finite samples are dropped. The
/// coefficient is `nominal * median(lr) / reference_lr`.
pub fn calibrate(
    store: &dyn ArrayStore,
    lidar: LidarType,
    periods: &[TimePeriod],
    input_dir: &Path,
) -> AlcfResult<CalibrationRecord> {
    let descriptor = lidar.descriptor();
    let reference_lr = descriptor.sc_lidar_ratio.ok_or_else(|| {
        AlcfError::UnsupportedInstrument(format!(
            "{} has no reference stratocumulus lidar ratio",
            lidar
        ))
    })?;

    let files = store.list(input_dir)?;
    let mut pool = Vec::new();
    for path in &files {
        let context = path.display().to_string();
        let ds = store.read(path, &["time", "lr"])?;
        let time = ds.require("time", &context)?;
        let lr = ds.require("lr", &context)?;

        let mask = period_mask(&time.data, periods);
        let selected = lr.mask_first(&mask).ok_or_else(|| {
            AlcfError::format(
                &context,
                format!(
                    "lr shape {:?} does not match {} time steps",
                    lr.shape,
                    time.len()
                ),
            )
        })?;

        let before = pool.len();
        pool.extend(selected.data.iter().copied().filter(|v| v.is_finite()));
        debug!(
            file = %context,
            selected = selected.len(),
            kept = pool.len() - before,
            "Collected lidar ratio samples"
        );
    }

    let lr_median = median(&pool).ok_or_else(|| {
        AlcfError::InsufficientData(format!(
            "no lidar ratio samples in {} files over {} time periods",
            files.len(),
            periods.len()
        ))
    })?;
    let calibration_coeff = descriptor.calibration_coeff * lr_median / reference_lr;

    info!(
        lidar = %lidar,
        files = files.len(),
        samples = pool.len(),
        lr_median,
        calibration_coeff,
        "Calibration complete"
    );

    Ok(CalibrationRecord {
        lidar,
        wavelength: descriptor.wavelength_nm,
        calibration_coeff,
        lr_median,
        samples: pool.len(),
    })
}
