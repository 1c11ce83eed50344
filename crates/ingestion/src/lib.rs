//! Lidar and model normalization library.
//!
//! Converts instrument-specific lidar files and atmospheric model output into
//! the canonical ALCF schema defined in `alcf-common`.
//!
//! # Architecture
//!
//! This crate is used by the `alcf` service binary and by the calibration
//! crate. It provides:
//!
//! - Instrument adapters ([`lidars`]), one per [`LidarType`]
//! - Model adapters ([`models`]), one per [`ModelType`]
//! - Directory-level batch pipelines ([`pipeline`])
//! - Pipeline configuration ([`config`])

pub mod config;
pub mod lidars;
pub mod models;
pub mod pipeline;

use alcf_common::AlcfError;
use netcdf_parser::NetCdfError;

// Re-exports
pub use config::PipelineConfig;
pub use lidars::{InstrumentDescriptor, LidarReader, LidarType};
pub use models::{ModelReader, ModelType};
pub use pipeline::{LidarPipeline, ModelPipeline, PipelineSummary};

/// Convert a store error raised while reading input for adapter `source`.
///
/// Missing variables become format errors naming the file, the adapter and
/// the absent field.
pub(crate) fn source_error(err: NetCdfError, source: &str) -> AlcfError {
    match err {
        NetCdfError::MissingVariable { path, name } => {
            AlcfError::missing_field(&path, source, &name)
        }
        other => other.into(),
    }
}
