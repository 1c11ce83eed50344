//! Error types for the ALCF workspace.

use thiserror::Error;

/// Result type alias using AlcfError.
pub type AlcfResult<T> = Result<T, AlcfError>;

/// Primary error type for normalization and calibration.
#[derive(Debug, Error)]
pub enum AlcfError {
    // === Input Errors ===
    /// Malformed or incomplete input. `context` names the file, instrument or
    /// model involved so the failure can be diagnosed without re-running.
    #[error("Format error in {context}: {message}")]
    Format { context: String, message: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unsupported instrument: {0}")]
    UnsupportedInstrument(String),

    // === Statistics Errors ===
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    // === Storage Errors ===
    #[error("NetCDF error: {0}")]
    NetCdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AlcfError {
    /// Build a format error for an arbitrary context.
    pub fn format(context: impl Into<String>, message: impl Into<String>) -> Self {
        AlcfError::Format {
            context: context.into(),
            message: message.into(),
        }
    }

    /// A required native field is absent from a source file.
    pub fn missing_field(path: &str, source: &str, field: &str) -> Self {
        AlcfError::Format {
            context: format!("{} ({})", path, source),
            message: format!("missing required field '{}'", field),
        }
    }

    /// Whether this error is the FormatError kind.
    pub fn is_format(&self) -> bool {
        matches!(self, AlcfError::Format { .. })
    }

    /// Whether this error is the InsufficientDataError kind.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AlcfError::InsufficientData(_))
    }
}
