//! Consumed collaborator interfaces.
//!
//! The pipeline talks to two upstreams through object-safe traits so the
//! same logic runs against the real HTTP clients or test doubles:
//! - [`DatasetClient`]: dataset/version metadata and dimension option counts
//! - [`StreamingStore`]: the filtered CSV row stream for one version

pub mod dataset;
pub mod graph;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::CallerIdentity;
use crate::models::dataset::{DatasetDetails, Version};
use crate::query::filter::DimensionFilter;

pub use dataset::DatasetApiClient;
pub use graph::GraphStoreClient;

/// Transport-level failure from the dataset API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a non-success status.
    #[error("dataset api responded with status {0}")]
    ErrorStatus(u16),

    #[error("dataset api request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("dataset api response body: {0}")]
    Body(String),
}

impl ClientError {
    /// Response status code, when the upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ErrorStatus(code) => Some(*code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Body(_) => None,
        }
    }
}

/// Failure from the row-streaming store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the query; carries the store's own message.
    #[error("{0}")]
    Query(String),

    #[error("row stream request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for the dataset API.
#[async_trait]
pub trait DatasetClient: Send + Sync {
    async fn get_dataset(
        &self,
        caller: &CallerIdentity,
        dataset_id: &str,
    ) -> Result<DatasetDetails, ClientError>;

    async fn get_version(
        &self,
        caller: &CallerIdentity,
        dataset_id: &str,
        edition: &str,
        version: &str,
    ) -> Result<Version, ClientError>;

    /// Count-only options query (offset 0, limit 0): returns the total
    /// number of option values the dimension has on this version.
    async fn get_option_count(
        &self,
        dataset_id: &str,
        edition: &str,
        version: &str,
        dimension: &str,
    ) -> Result<usize, ClientError>;
}

/// Streaming read access to the backing observation store.
#[async_trait]
pub trait StreamingStore: Send + Sync {
    async fn stream_csv_rows(
        &self,
        instance_id: &str,
        filter_id: &str,
        filter: &DimensionFilter,
        limit: usize,
    ) -> Result<Box<dyn RowStream>, StoreError>;
}

/// Sequential, pull-based row delivery. `read` returns `None` at end of
/// stream; `close` must be called on every exit path.
#[async_trait]
pub trait RowStream: Send {
    async fn read(&mut self) -> Result<Option<String>, StoreError>;

    async fn close(&mut self) -> Result<(), StoreError>;
}
