//! In-memory array store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use alcf_common::{Array, Dataset};

use crate::error::{NetCdfError, NetCdfResult};
use crate::{stored_attributes, stored_dims, ArrayStore};

/// A map of path to file contents.
///
/// Files are held in their stored form: arrays plus raw attributes, with
/// canonical metadata folded into `standard_name`/`units` attributes exactly
/// as [`crate::NetcdfStore`] writes them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<PathBuf, Dataset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, dataset: Dataset) -> NetCdfResult<()> {
        let path = path.into();
        let stored = to_stored(&dataset);
        self.files
            .write()
            .map_err(|_| poisoned())?
            .insert(path, stored);
        Ok(())
    }

    /// Stored contents of a file.
    pub fn get(&self, path: &Path) -> Option<Dataset> {
        self.files.read().ok()?.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArrayStore for MemoryStore {
    fn list(&self, dir: &Path) -> NetCdfResult<Vec<PathBuf>> {
        let files = self.files.read().map_err(|_| poisoned())?;
        Ok(files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn read(&self, path: &Path, variables: &[&str]) -> NetCdfResult<Dataset> {
        let files = self.files.read().map_err(|_| poisoned())?;
        let file = files.get(path).ok_or_else(|| {
            NetCdfError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })?;

        let mut out = Dataset::new();
        for &name in variables {
            let array = file
                .get(name)
                .ok_or_else(|| NetCdfError::MissingVariable {
                    path: path.display().to_string(),
                    name: name.to_string(),
                })?;
            out.insert(name, array.clone());
            if let Some(attrs) = file.attributes.get(name) {
                out.attributes.insert(name.to_string(), attrs.clone());
            }
        }
        Ok(out)
    }

    fn write(&self, path: &Path, dataset: &Dataset) -> NetCdfResult<()> {
        self.insert(path, dataset.clone())
    }
}

fn to_stored(dataset: &Dataset) -> Dataset {
    let mut stored = Dataset::new();
    for (name, array) in &dataset.variables {
        let dims = stored_dims(dataset, name);
        stored.insert(
            name,
            Array {
                dims,
                shape: array.shape.clone(),
                data: array.data.clone(),
            },
        );
        let attrs = stored_attributes(dataset, name);
        if !attrs.is_empty() {
            stored.attributes.insert(name.clone(), attrs);
        }
    }
    stored
}

fn poisoned() -> NetCdfError {
    NetCdfError::Library("memory store lock poisoned".to_string())
}
