//! Antarctic Mesoscale Prediction System (AMPS).
//!
//! AMPS output is standard WRF output, one forecast time per file. Native
//! fields are read at the first `Time` index; 3-D fields are
//! `(bottom_top, south_north, west_east)` after that, with the geopotential
//! on staggered half levels.

use std::path::Path;

use alcf_common::{normalize_lon, AlcfError, AlcfResult, Array, Dataset, Track};
use netcdf_parser::ArrayStore;
use tracing::{debug, info, warn};

use super::{candidates, index_directory, nearest_cell, IndexEntry, ModelReader};
use crate::source_error;

/// Poisson constant for dry air.
pub const KAPPA: f64 = 0.2854;

/// Standard gravity (m s-2).
pub const GRAVITY: f64 = 9.81;

/// Cloud fraction reported at every level. AMPS does not output a cloud
/// fraction diagnostic.
pub const CLOUD_FRACTION: f64 = 100.0;

const KEY: &str = "amps";

static VARIABLES: &[&str] = &[
    "QCLOUD", "QICE", "PSFC", "P", "PB", "PHB", "PH", "HGT", "XTIME", "XLONG", "XLAT", "T",
    "T00",
];

/// AMPS adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Amps;

impl ModelReader for Amps {
    fn key(&self) -> &'static str {
        KEY
    }

    fn read(&self, store: &dyn ArrayStore, dir: &Path, track: &Track) -> AlcfResult<Dataset> {
        let index = index_directory(store, dir, "XTIME", KEY)?;
        let selected = candidates(&index, track);
        info!(
            dir = %dir.display(),
            files = index.len(),
            candidates = selected.len(),
            "Reading AMPS output"
        );

        let mut profiles = Vec::with_capacity(selected.len());
        let mut last_time: Option<f64> = None;
        for entry in selected {
            if last_time == Some(entry.time) {
                warn!(
                    file = %entry.path.display(),
                    time = entry.time,
                    "Skipping file with duplicate timestamp"
                );
                continue;
            }
            last_time = Some(entry.time);
            profiles.push(read_profile(store, entry, track)?);
        }

        if profiles.is_empty() {
            info!(dir = %dir.display(), "No AMPS files overlap the track");
            return Ok(Dataset::empty());
        }

        let merged = Dataset::merge_time(profiles)?;
        merged.validate()?;
        Ok(merged)
    }
}

/// The native fields of one file at `Time = 0`.
struct Fields {
    raw: Dataset,
    context: String,
}

impl Fields {
    fn get(&self, name: &str) -> AlcfResult<Array> {
        let array = self.raw.require(name, &self.context)?;
        array.index_first(0).ok_or_else(|| {
            AlcfError::format(&self.context, format!("'{}' has no time steps", name))
        })
    }

    fn column(&self, name: &str, i: usize, j: usize) -> AlcfResult<Vec<f64>> {
        self.get(name)?.column(i, j).ok_or_else(|| {
            AlcfError::format(
                &self.context,
                format!("'{}' is not a (level, y, x) field", name),
            )
        })
    }

    fn surface(&self, name: &str, i: usize, j: usize) -> AlcfResult<f64> {
        self.get(name)?.at2(i, j).ok_or_else(|| {
            AlcfError::format(&self.context, format!("'{}' is not a (y, x) field", name))
        })
    }

    fn scalar(&self, name: &str) -> AlcfResult<f64> {
        self.get(name)?.as_scalar().ok_or_else(|| {
            AlcfError::format(&self.context, format!("'{}' is not a single value", name))
        })
    }
}

fn read_profile(store: &dyn ArrayStore, entry: &IndexEntry, track: &Track) -> AlcfResult<Dataset> {
    let raw = store
        .read(&entry.path, VARIABLES)
        .map_err(|e| source_error(e, KEY))?;
    let fields = Fields {
        raw,
        context: format!("{} ({})", entry.path.display(), KEY),
    };

    let position = track.nearest(entry.time);
    let lon = fields.get("XLONG")?;
    let lat = fields.get("XLAT")?;
    let (i, j) = nearest_cell(&lon, &lat, position.lon, position.lat).ok_or_else(|| {
        AlcfError::format(
            &fields.context,
            format!("XLONG {:?} and XLAT {:?} are not matching grids", lon.shape, lat.shape),
        )
    })?;
    debug!(
        file = %entry.path.display(),
        i,
        j,
        lon = position.lon,
        lat = position.lat,
        "Selected grid cell"
    );

    let clw = fields.column("QCLOUD", i, j)?;
    let cli = fields.column("QICE", i, j)?;
    let ps = fields.surface("PSFC", i, j)?;
    let orog = fields.surface("HGT", i, j)?;
    let p = fields.column("P", i, j)?;
    let pb = fields.column("PB", i, j)?;
    let ph = fields.column("PH", i, j)?;
    let phb = fields.column("PHB", i, j)?;
    let theta = fields.column("T", i, j)?;
    let t00 = fields.scalar("T00")?;

    let pfull: Vec<f64> = pb.iter().zip(&p).map(|(pb, p)| pb + p).collect();
    let zg = full_levels(
        &phb.iter()
            .zip(&ph)
            .map(|(phb, ph)| (phb + ph) / GRAVITY)
            .collect::<Vec<_>>(),
    );
    let ta: Vec<f64> = theta
        .iter()
        .zip(&pfull)
        .map(|(t, p)| (t + t00) * (p / ps).powf(KAPPA))
        .collect();
    let clt = vec![CLOUD_FRACTION; clw.len()];

    let cell_lon = normalize_lon(fields.surface("XLONG", i, j)?);
    let cell_lat = fields.surface("XLAT", i, j)?;

    let mut out = Dataset::new();
    for (name, values) in [
        ("clw", clw),
        ("cli", cli),
        ("ta", ta),
        ("clt", clt),
        ("pfull", pfull),
        ("zg", zg),
    ] {
        let n = values.len();
        out.insert_canonical(name, Array::from_rows(["time", "level"], 1, n, values)?)?;
    }
    for (name, value) in [
        ("ps", ps),
        ("orog", orog),
        ("lon", cell_lon),
        ("lat", cell_lat),
        ("time", entry.time),
    ] {
        out.insert_canonical(name, Array::from_vec("time", vec![value]))?;
    }
    Ok(out)
}

/// Average adjacent half-level values onto full levels.
fn full_levels(half: &[f64]) -> Vec<f64> {
    half.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
}
