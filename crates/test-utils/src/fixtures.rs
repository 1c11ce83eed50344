//! Common fixtures for ALCF tests.
//!
//! Helpers that seed a [`MemoryStore`] with whole directories of synthetic
//! input files, plus sample text inputs.

use std::path::{Path, PathBuf};

use alcf_common::Dataset;
use netcdf_parser::MemoryStore;

use crate::generators::{amps_raw, chm15k_raw, AmpsGrid};

/// CHM 15k time of 2016-01-01T00:00:00Z (seconds since 1904-01-01).
pub const CHM15K_2016: f64 = 3_534_451_200.0;

/// A time-periods file with two overlapping periods and a blank line.
pub const TIME_PERIODS: &str = "\
2016-01-01T00:00:00 2016-01-01T06:00:00

2016-01-01T03:00 2016-01-01T12:00
";

/// Insert `files` under `dir`, returning their paths in input order.
pub fn seed<N: AsRef<Path>>(
    store: &MemoryStore,
    dir: &Path,
    files: impl IntoIterator<Item = (N, Dataset)>,
) -> Vec<PathBuf> {
    files
        .into_iter()
        .map(|(name, ds)| {
            let path = dir.join(name);
            store
                .insert(path.clone(), ds)
                .expect("memory store insert");
            path
        })
        .collect()
}

/// A store with `n_files` CHM 15k files of `n_time` x `n_range` under `dir`,
/// one hour apart from 2016-01-01.
pub fn chm15k_store(dir: &Path, n_files: usize, n_time: usize, n_range: usize) -> MemoryStore {
    let store = MemoryStore::new();
    seed(
        &store,
        dir,
        (0..n_files).map(|f| {
            (
                format!("chm15k_{:02}.nc", f),
                chm15k_raw(n_time, n_range, CHM15K_2016 + 3600.0 * f as f64),
            )
        }),
    );
    store
}

/// A store with one AMPS file per entry of `hours` under `dir`.
pub fn amps_store(dir: &Path, grid: &AmpsGrid, hours: &[f64]) -> MemoryStore {
    let store = MemoryStore::new();
    for &h in hours {
        let path = dir.join(format!("wrfout_d03_{:05.1}.nc", h));
        store
            .insert(path, amps_raw(grid, h))
            .expect("memory store insert");
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcdf_parser::ArrayStore;

    #[test]
    fn test_chm15k_store_listing() {
        let dir = Path::new("/data/chm15k");
        let store = chm15k_store(dir, 3, 2, 4);
        let files = store.list(dir).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("chm15k_00.nc"));
    }

    #[test]
    fn test_amps_store_names_sort_by_time() {
        let dir = Path::new("/data/amps");
        let store = amps_store(dir, &AmpsGrid::default(), &[12.0, 6.0]);
        let files = store.list(dir).unwrap();
        assert!(files[0].ends_with("wrfout_d03_006.0.nc"));
        assert!(files[1].ends_with("wrfout_d03_012.0.nc"));
    }
}
