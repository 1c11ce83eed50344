//! Self-describing array file access for ALCF adapters.
//!
//! Instrument and model adapters never open files directly; they go through
//! an [`ArrayStore`], which reads exactly the named variables of a file into
//! a [`Dataset`] (arrays plus raw string attributes, no canonical metadata)
//! and writes canonical datasets back out.
//!
//! # Implementations
//!
//! - [`NetcdfStore`] (feature `native`): NetCDF files through libnetcdf.
//! - [`MemoryStore`]: an in-process map of path to dataset, used in tests and
//!   for callers that already hold data in memory.
//!
//! Both stores share the same on-disk conventions: canonical metadata is
//! written as `standard_name` and `units` variable attributes, and comes
//! back as raw attributes on the next read.

pub mod error;
pub mod memory;
#[cfg(feature = "native")]
pub mod native;

use std::path::{Path, PathBuf};

use alcf_common::{Attributes, Dataset};

pub use error::{NetCdfError, NetCdfResult};
pub use memory::MemoryStore;
#[cfg(feature = "native")]
pub use native::{silence_hdf5_errors, NetcdfStore};

/// Access to a collection of self-describing array files.
pub trait ArrayStore {
    /// Regular files directly inside `dir`, sorted by file name.
    fn list(&self, dir: &Path) -> NetCdfResult<Vec<PathBuf>>;

    /// Read exactly the named variables of a file.
    ///
    /// Fails with [`NetCdfError::MissingVariable`] if any is absent.
    fn read(&self, path: &Path, variables: &[&str]) -> NetCdfResult<Dataset>;

    /// Write a dataset, replacing any existing file.
    fn write(&self, path: &Path, dataset: &Dataset) -> NetCdfResult<()>;
}

/// List the regular files directly inside `dir`, sorted by name.
pub fn list_files(dir: &Path) -> NetCdfResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Attributes written for a variable: canonical metadata when present,
/// otherwise the raw attributes it carries.
pub(crate) fn stored_attributes(dataset: &Dataset, name: &str) -> Attributes {
    match dataset.meta.get(name) {
        Some(meta) => {
            let mut attrs = Attributes::new();
            attrs.insert("standard_name".to_string(), meta.standard_name.clone());
            attrs.insert("units".to_string(), meta.units.clone());
            attrs
        }
        None => dataset.attributes.get(name).cloned().unwrap_or_default(),
    }
}

/// Dimension names written for a variable.
pub(crate) fn stored_dims(dataset: &Dataset, name: &str) -> Vec<String> {
    match (dataset.meta.get(name), dataset.get(name)) {
        (Some(meta), Some(array)) if meta.dims.len() == array.ndim() => meta.dims.clone(),
        (_, Some(array)) => array.dims.clone(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_list_files_sorted_and_flat() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.nc"), b"").unwrap();
        fs::write(dir.path().join("a.nc"), b"").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.nc"), b"").unwrap();

        let files = list_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.nc", "b.nc"]);
    }

    #[test]
    fn test_list_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(&dir.path().join("nope")).is_err());
    }
}
