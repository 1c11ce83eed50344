//! Observation platform tracks.
//!
//! Model adapters locate the grid cell matching an observation by
//! following a track: a time-ordered list of positions.

use serde::{Deserialize, Serialize};

use crate::error::{AlcfError, AlcfResult};
use crate::schema::Dataset;

/// A platform position at one instant (Julian day, degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub time: f64,
    pub lon: f64,
    pub lat: f64,
}

/// Time-ordered platform positions.
///
/// Serialized as the bare list of points; deserializing applies the same
/// checks as [`Track::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TrackPoint>", into = "Vec<TrackPoint>")]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl TryFrom<Vec<TrackPoint>> for Track {
    type Error = AlcfError;

    fn try_from(points: Vec<TrackPoint>) -> AlcfResult<Self> {
        Self::new(points)
    }
}

impl From<Track> for Vec<TrackPoint> {
    fn from(track: Track) -> Self {
        track.points
    }
}

impl Track {
    /// Create a track. Points must be non-empty and time-ordered.
    pub fn new(points: Vec<TrackPoint>) -> AlcfResult<Self> {
        if points.is_empty() {
            return Err(AlcfError::format("track", "track has no points"));
        }
        if points.windows(2).any(|w| !(w[1].time >= w[0].time)) {
            return Err(AlcfError::format("track", "track times are not ordered"));
        }
        Ok(Self { points })
    }

    /// A fixed site observed over `[start, end]`.
    pub fn stationary(lon: f64, lat: f64, start: f64, end: f64) -> AlcfResult<Self> {
        Self::new(vec![
            TrackPoint {
                time: start,
                lon,
                lat,
            },
            TrackPoint {
                time: end,
                lon,
                lat,
            },
        ])
    }

    /// Build a track from a dataset with `time`, `lon` and `lat` variables.
    pub fn from_dataset(ds: &Dataset, context: &str) -> AlcfResult<Self> {
        let time = ds.require("time", context)?;
        let lon = ds.require("lon", context)?;
        let lat = ds.require("lat", context)?;
        if lon.len() != time.len() || lat.len() != time.len() {
            return Err(AlcfError::format(
                context,
                format!(
                    "track variables differ in length (time {}, lon {}, lat {})",
                    time.len(),
                    lon.len(),
                    lat.len()
                ),
            ));
        }
        let points = time
            .data
            .iter()
            .zip(&lon.data)
            .zip(&lat.data)
            .map(|((&time, &lon), &lat)| TrackPoint { time, lon, lat })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn start(&self) -> f64 {
        self.points[0].time
    }

    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1].time
    }

    /// The point closest in time to `t`; the earliest point wins ties.
    pub fn nearest(&self, t: f64) -> &TrackPoint {
        let mut best = &self.points[0];
        let mut best_dt = (best.time - t).abs();
        for point in &self.points[1..] {
            let dt = (point.time - t).abs();
            if dt < best_dt {
                best = point;
                best_dt = dt;
            }
        }
        best
    }
}

/// Normalize a longitude to `[0, 360)`.
pub fn normalize_lon(lon: f64) -> f64 {
    let lon = lon.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if lon >= 360.0 {
        0.0
    } else {
        lon
    }
}
