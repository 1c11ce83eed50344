//! Synthetic input files with predictable values.
//!
//! Each generator returns a [`Dataset`] in stored form (arrays plus raw
//! attributes) shaped like the files the adapters read, so that tests can
//! seed a `MemoryStore` and verify conversions by hand.

use alcf_common::{Array, Attributes, Dataset};

/// Raw CHM 15k file.
///
/// - `time`: `start_seconds + 15 * t` (seconds since 1904-01-01)
/// - `beta_raw[t, k] = t * 1000 + k`
/// - `range[k] = 15 * (k + 1)`
/// - `altitude = 100`
pub fn chm15k_raw(n_time: usize, n_range: usize, start_seconds: f64) -> Dataset {
    let mut ds = Dataset::new();
    ds.insert(
        "time",
        Array::from_vec(
            "time",
            (0..n_time).map(|t| start_seconds + 15.0 * t as f64).collect(),
        ),
    );
    let beta_raw = (0..n_time)
        .flat_map(|t| (0..n_range).map(move |k| (t * 1000 + k) as f64))
        .collect();
    ds.insert(
        "beta_raw",
        Array {
            dims: vec!["time".to_string(), "range".to_string()],
            shape: vec![n_time, n_range],
            data: beta_raw,
        },
    );
    ds.insert(
        "range",
        Array::from_vec("range", (0..n_range).map(|k| 15.0 * (k + 1) as f64).collect()),
    );
    ds.insert("altitude", Array::scalar(100.0));
    ds
}

/// Layout of a synthetic AMPS (WRF) grid.
#[derive(Debug, Clone, Copy)]
pub struct AmpsGrid {
    /// Number of full levels
    pub nz: usize,
    pub ny: usize,
    pub nx: usize,
    /// Longitude of column 0
    pub lon0: f64,
    /// Latitude of row 0
    pub lat0: f64,
    /// Grid spacing (degrees)
    pub step: f64,
}

impl Default for AmpsGrid {
    fn default() -> Self {
        Self {
            nz: 3,
            ny: 2,
            nx: 2,
            lon0: 166.0,
            lat0: -78.0,
            step: 1.0,
        }
    }
}

impl AmpsGrid {
    /// Flat index of cell `(i, j)`.
    pub fn cell(&self, i: usize, j: usize) -> usize {
        i * self.nx + j
    }
}

/// Raw AMPS file at `hours` after 2016-01-01 00:00 UTC.
///
/// Fields have a leading `Time` axis of length one. Per cell `c` (row-major
/// index) and level `k`:
///
/// - `XLONG = lon0 + j * step`, `XLAT = lat0 + i * step`
/// - `QCLOUD = 1e-5 * (k + 1) + 1e-7 * c`, `QICE = QCLOUD / 10`
/// - `PSFC = 100000 - 100 * c`, `HGT = 10 * c`
/// - `PB = 90000 - 10000 * k`, `P = 100 * c`
/// - `PHB = 9.81 * 1000 * k` on `nz + 1` half levels, `PH = 0`
/// - `T = 10 * k`, `T00 = 290`
pub fn amps_raw(grid: &AmpsGrid, hours: f64) -> Dataset {
    let AmpsGrid { nz, ny, nx, .. } = *grid;
    let cells = ny * nx;
    let mut ds = Dataset::new();

    let field3 = |levels: usize, f: &dyn Fn(usize, usize) -> f64| -> Array {
        let data = (0..levels)
            .flat_map(|k| (0..cells).map(move |c| (k, c)))
            .map(|(k, c)| f(k, c))
            .collect();
        Array {
            dims: ["Time", "bottom_top", "south_north", "west_east"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            shape: vec![1, levels, ny, nx],
            data,
        }
    };
    let field2 = |f: &dyn Fn(usize, usize) -> f64| -> Array {
        let data = (0..ny)
            .flat_map(|i| (0..nx).map(move |j| (i, j)))
            .map(|(i, j)| f(i, j))
            .collect();
        Array {
            dims: ["Time", "south_north", "west_east"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            shape: vec![1, ny, nx],
            data,
        }
    };

    ds.insert("QCLOUD", field3(nz, &|k: usize, c: usize| 1e-5 * (k + 1) as f64 + 1e-7 * c as f64));
    ds.insert("QICE", field3(nz, &|k: usize, c: usize| (1e-5 * (k + 1) as f64 + 1e-7 * c as f64) / 10.0));
    ds.insert("PB", field3(nz, &|k: usize, _| 90000.0 - 10000.0 * k as f64));
    ds.insert("P", field3(nz, &|_, c: usize| 100.0 * c as f64));
    ds.insert("T", field3(nz, &|k: usize, _| 10.0 * k as f64));
    ds.insert("PHB", field3(nz + 1, &|k: usize, _| 9.81 * 1000.0 * k as f64));
    ds.insert("PH", field3(nz + 1, &|_, _| 0.0));

    ds.insert("PSFC", field2(&|i: usize, j: usize| 100000.0 - 100.0 * grid.cell(i, j) as f64));
    ds.insert("HGT", field2(&|i: usize, j: usize| 10.0 * grid.cell(i, j) as f64));
    ds.insert("XLONG", field2(&|_, j: usize| grid.lon0 + j as f64 * grid.step));
    ds.insert("XLAT", field2(&|i: usize, _| grid.lat0 + i as f64 * grid.step));

    ds.insert("T00", Array::from_vec("Time", vec![290.0]));
    ds.insert("XTIME", Array::from_vec("Time", vec![hours * 60.0]));
    ds.attributes.insert(
        "XTIME".to_string(),
        attributes(&[("units", "minutes since 2016-01-01 00:00:00")]),
    );
    ds
}

/// Canonical lidar-ratio file: one `lr` value per time step.
pub fn lidar_ratio(times: &[f64], lr: &[f64]) -> Dataset {
    let mut ds = Dataset::new();
    ds.insert_canonical("time", Array::from_vec("time", times.to_vec()))
        .expect("time is canonical");
    ds.insert_canonical("lr", Array::from_vec("time", lr.to_vec()))
        .expect("lr is canonical");
    ds
}

/// Attribute map from key/value pairs.
pub fn attributes(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chm15k_raw_pattern() {
        let ds = chm15k_raw(2, 3, 0.0);
        assert_eq!(ds.get("beta_raw").unwrap().data, vec![0.0, 1.0, 2.0, 1000.0, 1001.0, 1002.0]);
        assert_eq!(ds.get("range").unwrap().data, vec![15.0, 30.0, 45.0]);
        assert_eq!(ds.get("time").unwrap().data, vec![0.0, 15.0]);
    }

    #[test]
    fn test_amps_raw_shapes() {
        let grid = AmpsGrid::default();
        let ds = amps_raw(&grid, 6.0);
        assert_eq!(ds.get("QCLOUD").unwrap().shape, vec![1, 3, 2, 2]);
        assert_eq!(ds.get("PHB").unwrap().shape, vec![1, 4, 2, 2]);
        assert_eq!(ds.get("PSFC").unwrap().shape, vec![1, 2, 2]);
        assert_eq!(ds.get("XLONG").unwrap().data, vec![166.0, 167.0, 166.0, 167.0]);
        assert_eq!(ds.get("XLAT").unwrap().data, vec![-78.0, -78.0, -77.0, -77.0]);
        assert_eq!(ds.get("XTIME").unwrap().data, vec![360.0]);
        assert!(ds.attribute("XTIME", "units").is_some());
    }

    #[test]
    fn test_lidar_ratio_is_canonical() {
        let ds = lidar_ratio(&[1.0, 2.0], &[18.0, 19.0]);
        ds.validate().unwrap();
        assert_eq!(ds.meta["lr"].units, "sr");
    }
}
