//! Directory-level conversion pipelines.
//!
//! [`LidarPipeline`] converts every file of an instrument directory and
//! writes one canonical file per input under the same name.
//! [`ModelPipeline`] extracts model columns along a track into one output
//! file.

use std::path::{Path, PathBuf};

use alcf_common::{AlcfError, AlcfResult, Track};
use netcdf_parser::ArrayStore;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::lidars::LidarType;
use crate::models::ModelType;

/// Outcome of a lidar pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    /// Output files written
    pub processed: Vec<PathBuf>,
    /// Input files that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl PipelineSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converts a directory of raw instrument files.
pub struct LidarPipeline<'a> {
    store: &'a dyn ArrayStore,
    lidar: LidarType,
    config: &'a PipelineConfig,
}

impl<'a> LidarPipeline<'a> {
    pub fn new(store: &'a dyn ArrayStore, lidar: LidarType, config: &'a PipelineConfig) -> Self {
        Self {
            store,
            lidar,
            config,
        }
    }

    /// Convert every file in `input_dir` into `output_dir`.
    ///
    /// A file that fails is logged and recorded in the summary; with
    /// `continue_on_error` off the first failure aborts the run.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> AlcfResult<PipelineSummary> {
        let files = self.store.list(input_dir)?;
        info!(
            lidar = %self.lidar,
            input = %input_dir.display(),
            files = files.len(),
            "Starting lidar conversion"
        );

        let mut summary = PipelineSummary::default();
        for input in files {
            match self.convert(&input, output_dir) {
                Ok(output) => {
                    info!(input = %input.display(), output = %output.display(), "Converted");
                    summary.processed.push(output);
                }
                Err(e) if self.config.continue_on_error => {
                    error!(input = %input.display(), error = %e, "Conversion failed");
                    summary.failed.push((input, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            processed = summary.processed.len(),
            failed = summary.failed.len(),
            "Lidar conversion finished"
        );
        Ok(summary)
    }

    fn convert(&self, input: &Path, output_dir: &Path) -> AlcfResult<PathBuf> {
        let name = input.file_name().ok_or_else(|| {
            AlcfError::format(input.display().to_string(), "input path has no file name")
        })?;
        let dataset = self
            .lidar
            .reader()
            .read(self.store, input, &self.config.lidar_variables())?;
        let output = output_dir.join(name);
        self.store.write(&output, &dataset)?;
        Ok(output)
    }
}

/// Extracts model columns along a track.
pub struct ModelPipeline<'a> {
    store: &'a dyn ArrayStore,
    model: ModelType,
}

impl<'a> ModelPipeline<'a> {
    pub fn new(store: &'a dyn ArrayStore, model: ModelType) -> Self {
        Self { store, model }
    }

    /// Read `input_dir` along `track` and write the result to `output`.
    ///
    /// Returns `None` without writing anything when no model file overlaps
    /// the track.
    pub fn run(&self, input_dir: &Path, track: &Track, output: &Path) -> AlcfResult<Option<PathBuf>> {
        let dataset = self.model.reader().read(self.store, input_dir, track)?;
        if dataset.is_empty() {
            warn!(
                model = %self.model,
                input = %input_dir.display(),
                "No model data overlaps the track; nothing written"
            );
            return Ok(None);
        }

        self.store.write(output, &dataset)?;
        info!(
            model = %self.model,
            output = %output.display(),
            steps = dataset.len_time(),
            "Wrote model columns"
        );
        Ok(Some(output.to_path_buf()))
    }
}
