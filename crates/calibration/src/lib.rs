//! Backscatter calibration.
//!
//! Implements the O'Connor et al. (2004) method: in fully opaque
//! stratocumulus the attenuated backscatter integrates to a known lidar
//! ratio, so the median lidar ratio observed during cloud periods scales the
//! instrument's nominal calibration coefficient.
//!
//! # Usage
//!
//! ```ignore
//! let periods = read_time_periods(Path::new("time_periods.txt"))?;
//! let record = calibrate(&store, LidarType::Chm15k, &periods, Path::new("lidar"))?;
//! record.write_record(Path::new("calibration.txt"))?;
//! ```

mod calibrate;
pub mod periods;
pub mod stats;

pub use calibrate::{calibrate, CalibrationRecord};
pub use periods::{parse_time_periods, read_time_periods};
pub use stats::median;
