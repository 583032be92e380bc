//! Observation API
//!
//! Answers one query: given a dataset version and a set of dimension-value
//! selections (with at most one wildcard), return the matching statistical
//! observations.

pub mod auth;
pub mod clients;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod query;

pub use config::Config;
pub use errors::ObservationError;
pub use http::HttpServer;
pub use query::{QueryEngine, VersionTarget};
