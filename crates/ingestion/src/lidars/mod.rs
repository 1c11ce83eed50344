//! Instrument adapter registry.
//!
//! Each supported lidar type is one variant of [`LidarType`], mapped to a
//! static [`InstrumentDescriptor`] and a [`LidarReader`] that converts one
//! raw file into the canonical schema. Adding an instrument means adding a
//! variant and its reader; dispatch stays untouched.

mod chm15k;
mod cosp;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use alcf_common::{AlcfError, AlcfResult, Dataset};
use netcdf_parser::ArrayStore;
use serde::{Deserialize, Serialize};

pub use chm15k::Chm15k;
pub use cosp::Cosp;

/// Static constants of one instrument type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentDescriptor {
    /// Registry key
    pub key: &'static str,
    /// Human-readable instrument name
    pub name: &'static str,
    /// Laser wavelength (nm)
    pub wavelength_nm: u32,
    /// Nominal backscatter calibration coefficient
    pub calibration_coeff: f64,
    /// Reference lidar ratio of opaque stratocumulus (sr), if published
    pub sc_lidar_ratio: Option<f64>,
    /// Ground-based (true) or space-based (false)
    pub surface: bool,
}

/// Common interface of instrument adapters.
pub trait LidarReader: Sync {
    fn descriptor(&self) -> &'static InstrumentDescriptor;

    /// Native fields needed to derive each canonical variable.
    fn dependencies(&self) -> &'static [(&'static str, &'static [&'static str])];

    /// The minimal set of native fields to read for `requested`, sorted.
    fn native_fields<'a>(&self, requested: &[&'a str]) -> Vec<&'a str> {
        let mut fields: Vec<&'a str> = self
            .dependencies()
            .iter()
            .filter(|(name, _)| requested.contains(name))
            .flat_map(|(_, deps)| deps.iter().copied())
            .collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }

    /// Convert one raw file into the canonical schema.
    ///
    /// Only requested variables appear in the output and its metadata.
    fn read(&self, store: &dyn ArrayStore, path: &Path, variables: &[&str])
        -> AlcfResult<Dataset>;
}

/// Supported lidar instrument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LidarType {
    /// Lufft CHM 15k ceilometer
    Chm15k,
    /// Previously normalized or simulated output, read as-is
    Cosp,
}

impl LidarType {
    pub const ALL: [LidarType; 2] = [LidarType::Chm15k, LidarType::Cosp];

    pub fn as_str(&self) -> &'static str {
        self.descriptor().key
    }

    pub fn descriptor(&self) -> &'static InstrumentDescriptor {
        self.reader().descriptor()
    }

    pub fn reader(&self) -> &'static dyn LidarReader {
        match self {
            LidarType::Chm15k => &Chm15k,
            LidarType::Cosp => &Cosp,
        }
    }
}

impl fmt::Display for LidarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LidarType {
    type Err = AlcfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LidarType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AlcfError::UnknownType(format!("lidar '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lidar_type() {
        assert_eq!("chm15k".parse::<LidarType>().unwrap(), LidarType::Chm15k);
        assert_eq!("CHM15K".parse::<LidarType>().unwrap(), LidarType::Chm15k);
        assert_eq!("cosp".parse::<LidarType>().unwrap(), LidarType::Cosp);
        assert!(matches!(
            "cl99".parse::<LidarType>(),
            Err(AlcfError::UnknownType(_))
        ));
    }

    #[test]
    fn test_descriptor_keys_match() {
        for t in LidarType::ALL {
            assert_eq!(t.to_string().parse::<LidarType>().unwrap(), t);
        }
    }

    #[test]
    fn test_chm15k_descriptor() {
        let d = LidarType::Chm15k.descriptor();
        assert_eq!(d.wavelength_nm, 1064);
        assert_eq!(d.calibration_coeff, 0.2);
        assert_eq!(d.sc_lidar_ratio, Some(18.2));
        assert!(d.surface);
    }

    #[test]
    fn test_native_fields_minimal() {
        let reader = LidarType::Chm15k.reader();
        assert_eq!(reader.native_fields(&["time"]), vec!["time"]);
        assert_eq!(reader.native_fields(&["backscatter"]), vec!["beta_raw"]);
        assert_eq!(
            reader.native_fields(&["zfull", "time"]),
            vec!["altitude", "range", "time"]
        );
        assert!(reader.native_fields(&["unknown"]).is_empty());
    }
}
