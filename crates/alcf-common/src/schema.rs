//! Canonical dataset schema.
//!
//! Every adapter produces a [`Dataset`]: a set of named row-major arrays plus
//! a metadata block giving the dimension names, standard name and unit of
//! each variable. The standard names and units come from the read-only
//! [`CANONICAL`] table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AlcfError, AlcfResult};
use crate::time::JULIAN_UNITS;

/// Standard name and unit of a canonical variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSpec {
    pub name: &'static str,
    pub standard_name: &'static str,
    pub units: &'static str,
}

/// Canonical variable table.
pub static CANONICAL: &[VarSpec] = &[
    VarSpec {
        name: "time",
        standard_name: "time",
        units: JULIAN_UNITS,
    },
    VarSpec {
        name: "backscatter",
        standard_name: "tropospheric_attenuated_volume_backscatter_coefficient",
        units: "m-1 sr-1",
    },
    VarSpec {
        name: "zfull",
        standard_name: "height_above_reference_ellipsoid",
        units: "m",
    },
    VarSpec {
        name: "lr",
        standard_name: "lidar_ratio",
        units: "sr",
    },
    VarSpec {
        name: "cloud_mask",
        standard_name: "cloud_binary_mask",
        units: "1",
    },
    VarSpec {
        name: "clw",
        standard_name: "mass_fraction_of_cloud_liquid_water_in_air",
        units: "1",
    },
    VarSpec {
        name: "cli",
        standard_name: "mass_fraction_of_cloud_ice_in_air",
        units: "1",
    },
    VarSpec {
        name: "ps",
        standard_name: "surface_air_pressure",
        units: "Pa",
    },
    VarSpec {
        name: "pfull",
        standard_name: "air_pressure",
        units: "Pa",
    },
    VarSpec {
        name: "zg",
        standard_name: "geopotential_height",
        units: "m",
    },
    VarSpec {
        name: "lon",
        standard_name: "longitude",
        units: "degrees_east",
    },
    VarSpec {
        name: "lat",
        standard_name: "latitude",
        units: "degrees_north",
    },
    VarSpec {
        name: "ta",
        standard_name: "air_temperature",
        units: "K",
    },
    VarSpec {
        name: "clt",
        standard_name: "cloud_area_fraction",
        units: "%",
    },
    VarSpec {
        name: "orog",
        standard_name: "surface_altitude",
        units: "m",
    },
];

/// Look up a canonical variable by name.
pub fn canonical(name: &str) -> Option<&'static VarSpec> {
    CANONICAL.iter().find(|spec| spec.name == name)
}

/// A dense n-dimensional array stored in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array {
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl Array {
    /// Create an array, checking that dims, shape and data agree.
    pub fn new(dims: Vec<String>, shape: Vec<usize>, data: Vec<f64>) -> AlcfResult<Self> {
        if dims.len() != shape.len() {
            return Err(AlcfError::format(
                "array",
                format!("{} dimension names for rank {}", dims.len(), shape.len()),
            ));
        }
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(AlcfError::format(
                "array",
                format!("shape {:?} needs {} values, got {}", shape, expected, data.len()),
            ));
        }
        Ok(Self { dims, shape, data })
    }

    /// One-dimensional array along `dim`.
    pub fn from_vec(dim: &str, data: Vec<f64>) -> Self {
        Self {
            dims: vec![dim.to_string()],
            shape: vec![data.len()],
            data,
        }
    }

    /// Two-dimensional array. `data` must hold `rows * cols` values.
    pub fn from_rows(dims: [&str; 2], rows: usize, cols: usize, data: Vec<f64>) -> AlcfResult<Self> {
        Self::new(
            dims.iter().map(|d| d.to_string()).collect(),
            vec![rows, cols],
            data,
        )
    }

    /// Rank-0 array.
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: Vec::new(),
            shape: Vec::new(),
            data: vec![value],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Length of the leading axis (1 for scalars).
    pub fn leading_len(&self) -> usize {
        self.shape.first().copied().unwrap_or(1)
    }

    /// Number of values in one slice along the leading axis.
    pub fn row_size(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    /// The single value of a scalar or one-element array.
    pub fn as_scalar(&self) -> Option<f64> {
        match self.data.as_slice() {
            [v] => Some(*v),
            _ => None,
        }
    }

    /// Slice at `index` along the leading axis, dropping that axis.
    pub fn index_first(&self, index: usize) -> Option<Array> {
        if self.ndim() == 0 || index >= self.leading_len() {
            return None;
        }
        let n = self.row_size();
        Some(Array {
            dims: self.dims[1..].to_vec(),
            shape: self.shape[1..].to_vec(),
            data: self.data[index * n..(index + 1) * n].to_vec(),
        })
    }

    /// Value at `(i, j)` of a two-dimensional array.
    pub fn at2(&self, i: usize, j: usize) -> Option<f64> {
        match self.shape.as_slice() {
            [ny, nx] if i < *ny && j < *nx => Some(self.data[i * nx + j]),
            _ => None,
        }
    }

    /// Vertical profile at `(i, j)` of a `(level, y, x)` array.
    pub fn column(&self, i: usize, j: usize) -> Option<Vec<f64>> {
        match self.shape.as_slice() {
            [nz, ny, nx] if i < *ny && j < *nx => Some(
                (0..*nz)
                    .map(|k| self.data[(k * ny + i) * nx + j])
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Keep the slices along the leading axis where `mask` is true.
    pub fn mask_first(&self, mask: &[bool]) -> Option<Array> {
        if self.ndim() == 0 || mask.len() != self.leading_len() {
            return None;
        }
        let n = self.row_size();
        let mut data = Vec::new();
        for (row, &keep) in self.data.chunks(n.max(1)).zip(mask) {
            if keep {
                data.extend_from_slice(row);
            }
        }
        let mut shape = self.shape.clone();
        shape[0] = mask.iter().filter(|&&keep| keep).count();
        Some(Array {
            dims: self.dims.clone(),
            shape,
            data,
        })
    }

    /// Concatenate arrays along the leading axis. All trailing shapes must match.
    pub fn concat_first(parts: &[&Array]) -> AlcfResult<Array> {
        let first = parts
            .first()
            .ok_or_else(|| AlcfError::format("array", "nothing to concatenate"))?;
        if first.ndim() == 0 {
            return Err(AlcfError::format("array", "cannot concatenate scalars"));
        }
        let mut data = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
        let mut leading = 0;
        for part in parts {
            if part.ndim() != first.ndim() || part.shape[1..] != first.shape[1..] {
                return Err(AlcfError::format(
                    "array",
                    format!(
                        "shape mismatch in concatenation: {:?} vs {:?}",
                        part.shape, first.shape
                    ),
                ));
            }
            leading += part.leading_len();
            data.extend_from_slice(&part.data);
        }
        let mut shape = first.shape.clone();
        shape[0] = leading;
        Ok(Array {
            dims: first.dims.clone(),
            shape,
            data,
        })
    }
}

/// Metadata of one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableMeta {
    pub dims: Vec<String>,
    pub standard_name: String,
    pub units: String,
}

impl VariableMeta {
    pub fn from_spec(spec: &VarSpec, dims: &[String]) -> Self {
        Self {
            dims: dims.to_vec(),
            standard_name: spec.standard_name.to_string(),
            units: spec.units.to_string(),
        }
    }
}

/// String attributes of one variable as found in a source file.
pub type Attributes = BTreeMap<String, String>;

/// The unit of exchange between all components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub variables: BTreeMap<String, Array>,
    pub meta: BTreeMap<String, VariableMeta>,
    /// Raw string attributes, filled in by file readers only.
    pub attributes: BTreeMap<String, Attributes>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dataset with zero time steps.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert an array without metadata.
    pub fn insert(&mut self, name: &str, array: Array) {
        self.variables.insert(name.to_string(), array);
    }

    /// Insert an array together with its canonical metadata.
    pub fn insert_canonical(&mut self, name: &str, array: Array) -> AlcfResult<()> {
        let spec = canonical(name).ok_or_else(|| {
            AlcfError::format("schema", format!("'{}' is not a canonical variable", name))
        })?;
        self.meta
            .insert(name.to_string(), VariableMeta::from_spec(spec, &array.dims));
        self.variables.insert(name.to_string(), array);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Array> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Get a variable or fail with a format error naming `context`.
    pub fn require(&self, name: &str, context: &str) -> AlcfResult<&Array> {
        self.variables.get(name).ok_or_else(|| {
            AlcfError::format(context, format!("missing required field '{}'", name))
        })
    }

    /// A raw string attribute of a variable.
    pub fn attribute(&self, variable: &str, key: &str) -> Option<&str> {
        self.attributes
            .get(variable)
            .and_then(|attrs| attrs.get(key))
            .map(String::as_str)
    }

    pub fn time(&self) -> Option<&[f64]> {
        self.variables.get("time").map(|a| a.data.as_slice())
    }

    /// Number of time steps.
    pub fn len_time(&self) -> usize {
        self.time().map_or(0, <[f64]>::len)
    }

    /// True when the dataset has no time steps.
    pub fn is_empty(&self) -> bool {
        self.len_time() == 0
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Keep only the requested variables and their metadata.
    ///
    /// Raw attributes are dropped.
    pub fn select(mut self, requested: &[&str]) -> Dataset {
        self.variables.retain(|name, _| requested.contains(&name.as_str()));
        self.meta.retain(|name, _| requested.contains(&name.as_str()));
        self.attributes.clear();
        self
    }

    /// Check the canonical-schema invariants: every variable has metadata
    /// matching its rank, and time is non-decreasing.
    pub fn validate(&self) -> AlcfResult<()> {
        for (name, array) in &self.variables {
            let meta = self.meta.get(name).ok_or_else(|| {
                AlcfError::format("schema", format!("variable '{}' has no metadata", name))
            })?;
            if meta.dims.len() != array.ndim() {
                return Err(AlcfError::format(
                    "schema",
                    format!(
                        "variable '{}' has rank {} but metadata declares {:?}",
                        name,
                        array.ndim(),
                        meta.dims
                    ),
                ));
            }
        }
        if let Some(time) = self.time() {
            if let Some(w) = time.windows(2).find(|w| !(w[1] >= w[0])) {
                return Err(AlcfError::format(
                    "schema",
                    format!("time is not non-decreasing ({} then {})", w[0], w[1]),
                ));
            }
        }
        Ok(())
    }

    /// Merge datasets along the time axis.
    ///
    /// Parts are ordered by their first timestamp (stable for equal times); a
    /// part whose first timestamp is already present is skipped. Variables
    /// with a leading `time` dimension are concatenated, others are taken from
    /// the first part. Metadata comes from the first part.
    pub fn merge_time(parts: Vec<Dataset>) -> AlcfResult<Dataset> {
        let mut parts: Vec<Dataset> = parts.into_iter().filter(|p| !p.is_empty()).collect();
        if parts.is_empty() {
            return Ok(Dataset::empty());
        }
        parts.sort_by(|a, b| a.first_time().total_cmp(&b.first_time()));

        let mut kept: Vec<Dataset> = Vec::with_capacity(parts.len());
        for part in parts {
            let duplicate = kept
                .iter()
                .any(|k| k.time().is_some_and(|t| t.contains(&part.first_time())));
            if !duplicate {
                kept.push(part);
            }
        }

        let first = &kept[0];
        let mut merged = Dataset {
            variables: BTreeMap::new(),
            meta: first.meta.clone(),
            attributes: BTreeMap::new(),
        };

        for (name, array) in &first.variables {
            if array.dims.first().map(String::as_str) != Some("time") {
                merged.variables.insert(name.clone(), array.clone());
                continue;
            }
            let slices = kept
                .iter()
                .map(|part| {
                    part.get(name).ok_or_else(|| {
                        AlcfError::format("merge", format!("variable '{}' missing from a part", name))
                    })
                })
                .collect::<AlcfResult<Vec<&Array>>>()?;
            merged
                .variables
                .insert(name.clone(), Array::concat_first(&slices)?);
        }

        Ok(merged)
    }

    fn first_time(&self) -> f64 {
        self.time().and_then(|t| t.first().copied()).unwrap_or(f64::NAN)
    }
}
