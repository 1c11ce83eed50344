//! Model adapter registry.
//!
//! A model adapter reads a directory of model output files along an
//! observation [`Track`] and returns the model column nearest to the track,
//! one profile per file, in the canonical schema.

mod amps;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use alcf_common::time::cf_to_julian;
use alcf_common::{normalize_lon, AlcfError, AlcfResult, Array, Dataset, Track};
use netcdf_parser::ArrayStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::source_error;

pub use amps::Amps;

/// Files whose first timestamp lies this far outside the track (days) are
/// still read.
pub const GRACE_TIME: f64 = 1.0 / 24.0;

/// Common interface of model adapters.
pub trait ModelReader: Sync {
    fn key(&self) -> &'static str;

    /// Extract the model columns along `track` from the files in `dir`.
    ///
    /// Returns an empty dataset when no file overlaps the track.
    fn read(&self, store: &dyn ArrayStore, dir: &Path, track: &Track) -> AlcfResult<Dataset>;
}

/// Supported model types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Antarctic Mesoscale Prediction System (WRF)
    Amps,
}

impl ModelType {
    pub const ALL: [ModelType; 1] = [ModelType::Amps];

    pub fn as_str(&self) -> &'static str {
        self.reader().key()
    }

    pub fn reader(&self) -> &'static dyn ModelReader {
        match self {
            ModelType::Amps => &Amps,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = AlcfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AlcfError::UnknownType(format!("model '{}'", s)))
    }
}

/// First timestamp of one model file.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub time: f64,
    pub path: PathBuf,
}

/// Read only the time coordinate of every file in `dir`.
///
/// The time variable must carry CF `units`. Entries are sorted by time, then
/// by path. Files with an empty time coordinate are skipped.
pub fn index_directory(
    store: &dyn ArrayStore,
    dir: &Path,
    time_var: &str,
    source: &str,
) -> AlcfResult<Vec<IndexEntry>> {
    let mut index = Vec::new();
    for path in store.list(dir).map_err(|e| source_error(e, source))? {
        let raw = store
            .read(&path, &[time_var])
            .map_err(|e| source_error(e, source))?;
        let context = format!("{} ({})", path.display(), source);
        let values = raw.require(time_var, &context)?;
        let units = raw.attribute(time_var, "units").ok_or_else(|| {
            AlcfError::format(&context, format!("'{}' has no units attribute", time_var))
        })?;
        let times = cf_to_julian(&values.data, units)
            .map_err(|e| AlcfError::format(&context, e.to_string()))?;

        match times.first() {
            Some(&time) => index.push(IndexEntry { time, path }),
            None => warn!(file = %path.display(), "Skipping file with no time steps"),
        }
    }

    index.sort_by(|a, b| a.time.total_cmp(&b.time).then_with(|| a.path.cmp(&b.path)));
    debug!(dir = %dir.display(), files = index.len(), "Indexed model directory");
    Ok(index)
}

/// Index entries within [`GRACE_TIME`] of the track's time range.
pub fn candidates<'a>(index: &'a [IndexEntry], track: &Track) -> Vec<&'a IndexEntry> {
    let start = track.start() - GRACE_TIME;
    let end = track.end() + GRACE_TIME;
    index
        .iter()
        .filter(|entry| entry.time >= start && entry.time <= end)
        .collect()
}

/// Grid cell `(i, j)` of two-dimensional `(y, x)` coordinate arrays nearest
/// to `(lon0, lat0)`.
///
/// Distance is squared Euclidean in degrees with both longitudes normalized
/// to `[0, 360)`. Cells are scanned in row-major order and the first minimum
/// wins.
pub fn nearest_cell(lon: &Array, lat: &Array, lon0: f64, lat0: f64) -> Option<(usize, usize)> {
    let nx = match lon.shape.as_slice() {
        [_, nx] if lon.shape == lat.shape => *nx,
        _ => return None,
    };
    let lon0 = normalize_lon(lon0);

    let mut best: Option<(usize, f64)> = None;
    for (l, (&x, &y)) in lon.data.iter().zip(&lat.data).enumerate() {
        let d = (normalize_lon(x) - lon0).powi(2) + (y - lat0).powi(2);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((l, d));
        }
    }
    best.map(|(l, _)| (l / nx, l % nx))
}
