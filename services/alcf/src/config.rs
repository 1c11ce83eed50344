//! Configuration loading for the command-line tool.

use std::path::Path;

use anyhow::{Context, Result};
use ingestion::PipelineConfig;

/// Load configuration from a YAML file, or from environment variables when
/// no file is given.
pub fn load(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(PipelineConfig::from_env()),
    }
}
