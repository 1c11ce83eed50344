//! Common types and utilities shared across the ALCF workspace.

pub mod error;
pub mod schema;
pub mod time;
pub mod track;

pub use error::{AlcfError, AlcfResult};
pub use schema::{canonical, Array, Attributes, Dataset, VarSpec, VariableMeta, CANONICAL};
pub use time::{period_mask, TimePeriod};
pub use track::{normalize_lon, Track, TrackPoint};
