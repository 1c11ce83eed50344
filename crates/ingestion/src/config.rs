//! Pipeline configuration.
//!
//! Loaded from a YAML file when one is given, otherwise from environment
//! variables on top of the defaults.

use std::fs;
use std::path::Path;

use alcf_common::{canonical, AlcfError, AlcfResult};
use serde::{Deserialize, Serialize};

/// Configuration shared by the lidar and model pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Canonical variables requested from lidar adapters.
    pub lidar_variables: Vec<String>,

    /// Log and skip files that fail to convert instead of aborting.
    pub continue_on_error: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines.
    pub log_json: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lidar_variables: vec![
                "time".to_string(),
                "backscatter".to_string(),
                "zfull".to_string(),
            ],
            continue_on_error: true,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ALCF_LIDAR_VARS") {
            config.lidar_variables = parse_list(&val);
        }

        if let Ok(val) = std::env::var("ALCF_CONTINUE_ON_ERROR") {
            config.continue_on_error = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("ALCF_LOG_LEVEL") {
            config.log_level = val.to_lowercase();
        }

        if let Ok(val) = std::env::var("ALCF_LOG_JSON") {
            config.log_json = parse_bool(&val);
        }

        config
    }

    /// Parse configuration from YAML text. Missing keys take their defaults.
    pub fn from_yaml(text: &str) -> AlcfResult<Self> {
        serde_yaml::from_str(text).map_err(|e| AlcfError::format("config", e.to_string()))
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> AlcfResult<Self> {
        let text = fs::read_to_string(path)?;
        serde_yaml::from_str(&text)
            .map_err(|e| AlcfError::format(path.display().to_string(), e.to_string()))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.lidar_variables.is_empty() {
            return Err("lidar_variables must not be empty".to_string());
        }

        if let Some(name) = self.lidar_variables.iter().find(|v| canonical(v).is_none()) {
            return Err(format!("'{}' is not a canonical variable", name));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(format!("unknown log level '{}'", other)),
        }

        Ok(())
    }

    /// Requested lidar variables as string slices.
    pub fn lidar_variables(&self) -> Vec<&str> {
        self.lidar_variables.iter().map(String::as_str).collect()
    }
}

fn parse_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(val: &str) -> bool {
    val.to_lowercase() == "true" || val == "1"
}
