//! Data models: dataset API documents and the observations response.

pub mod dataset;
pub mod observation;

pub use dataset::{DatasetDetails, LinkObject, UsageNote, Version, VersionDimension};
pub use observation::{DimensionObject, Observation, ObservationsDoc};
