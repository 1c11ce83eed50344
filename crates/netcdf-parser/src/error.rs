//! Error types for array file access.

use alcf_common::AlcfError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A requested variable is not in the file
    #[error("{path}: missing required variable '{name}'")]
    MissingVariable { path: String, name: String },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Error reported by libnetcdf
    #[error("NetCDF library error: {0}")]
    Library(String),
}

impl From<NetCdfError> for AlcfError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::IoError(e) => AlcfError::Io(e),
            NetCdfError::MissingVariable { path, name } => AlcfError::format(
                path,
                format!("missing required field '{}'", name),
            ),
            NetCdfError::InvalidFormat(msg) => AlcfError::format("netcdf", msg),
            NetCdfError::Library(msg) => AlcfError::NetCdf(msg),
        }
    }
}

#[cfg(feature = "native")]
impl From<netcdf::Error> for NetCdfError {
    fn from(err: netcdf::Error) -> Self {
        NetCdfError::Library(err.to_string())
    }
}
