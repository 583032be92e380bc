//! The observation query pipeline.
//!
//! # Data Flow
//! ```text
//! raw query + caller identity
//!     → access gate (published-only view for unauthorised callers)
//!     → dataset/version resolution (dataset API)
//!     → parameter validation against version dimensions
//!     → dimension filter build (wildcard extraction)
//!     → cardinality sort (bounded probe fan-out)
//!     → CSV row stream → observations
//!     → response document assembly
//! ```
//! Every stage maps its failures into [`ObservationError`]; the transport
//! layer only renders the result.

pub mod filter;
pub mod params;
pub mod sorter;
pub mod stream;

use std::sync::Arc;

use crate::auth::{self, CallerIdentity};
use crate::clients::{ClientError, DatasetClient, StreamingStore};
use crate::config::Config;
use crate::errors::ObservationError;
use crate::models::dataset::{is_valid_version_state, DatasetDetails, Version, STATE_PUBLISHED};
use crate::models::observation::{build_observations_doc, ObservationsDoc};

const DEFAULT_OFFSET: usize = 0;

/// Path coordinates of one dataset version.
#[derive(Debug, Clone)]
pub struct VersionTarget {
    pub dataset_id: String,
    pub edition: String,
    pub version: String,
}

/// Sequences the whole pipeline for one request scope.
pub struct QueryEngine {
    config: Arc<Config>,
    dataset_client: Arc<dyn DatasetClient>,
    store: Arc<dyn StreamingStore>,
}

impl QueryEngine {
    pub fn new(
        config: Arc<Config>,
        dataset_client: Arc<dyn DatasetClient>,
        store: Arc<dyn StreamingStore>,
    ) -> Self {
        Self {
            config,
            dataset_client,
            store,
        }
    }

    /// Answer one observations query.
    pub async fn get_observations(
        &self,
        target: &VersionTarget,
        raw_query: &str,
        caller: &CallerIdentity,
    ) -> Result<ObservationsDoc, ObservationError> {
        let authorised = auth::is_authorised(self.config.enable_private_endpoints, caller);

        let dataset = self.resolve_dataset(caller, authorised, target).await?;
        let version = self.resolve_version(caller, authorised, target).await?;

        if !is_valid_version_state(&version.state) {
            tracing::error!(
                dataset_id = %target.dataset_id,
                state = %version.state,
                "version has an invalid state"
            );
            return Err(ObservationError::InvalidResourceState(version.state));
        }

        let dimensions = match version.dimensions.as_deref() {
            Some(dimensions) if !dimensions.is_empty() => dimensions,
            _ => {
                tracing::error!(
                    dataset_id = %target.dataset_id,
                    "missing dimensions in version doc"
                );
                return Err(ObservationError::MissingVersionDimensions);
            }
        };

        let valid_names: Vec<String> =
            dimensions.iter().map(|d| d.name.to_lowercase()).collect();

        let query = params::parse_raw_query(raw_query);
        let parameters = params::extract_query_parameters(&query, &valid_names)?;

        let (mut dimension_filter, wildcard) = filter::build_filter(&parameters)?;

        sorter::sort_filter(
            Arc::clone(&self.dataset_client),
            self.config.cardinality,
            target,
            &mut dimension_filter,
        )
        .await;

        tracing::info!(
            dataset_id = %target.dataset_id,
            edition = %target.edition,
            version = %target.version,
            dimensions = dimension_filter.dimensions.len(),
            wildcard = wildcard.as_deref().unwrap_or(""),
            "query object built to retrieve observations"
        );

        let observations = stream::stream_observations(
            self.store.as_ref(),
            &version,
            &dimension_filter,
            wildcard.as_deref(),
            self.config.default_observation_limit,
        )
        .await?;

        Ok(build_observations_doc(
            raw_query,
            &version,
            &dataset,
            observations,
            &parameters,
            DEFAULT_OFFSET,
            self.config.default_observation_limit,
        ))
    }

    /// Fetch the dataset document and enforce the published-only view for
    /// unauthorised callers. Unpublished resources surface as not found.
    async fn resolve_dataset(
        &self,
        caller: &CallerIdentity,
        authorised: bool,
        target: &VersionTarget,
    ) -> Result<DatasetDetails, ObservationError> {
        let dataset = self
            .dataset_client
            .get_dataset(caller, &target.dataset_id)
            .await
            .map_err(|e| map_client_error(e, ObservationError::DatasetNotFound))?;

        if !authorised && dataset.state != STATE_PUBLISHED {
            tracing::error!(
                dataset_id = %target.dataset_id,
                state = %dataset.state,
                "dataset is not in published state"
            );
            return Err(ObservationError::DatasetNotFound);
        }

        Ok(dataset)
    }

    async fn resolve_version(
        &self,
        caller: &CallerIdentity,
        authorised: bool,
        target: &VersionTarget,
    ) -> Result<Version, ObservationError> {
        let version = self
            .dataset_client
            .get_version(caller, &target.dataset_id, &target.edition, &target.version)
            .await
            .map_err(|e| map_client_error(e, ObservationError::VersionNotFound))?;

        if !authorised && version.state != STATE_PUBLISHED {
            tracing::error!(
                dataset_id = %target.dataset_id,
                version = %target.version,
                state = %version.state,
                "version is not in published state"
            );
            return Err(ObservationError::VersionNotFound);
        }

        Ok(version)
    }
}

fn map_client_error(e: ClientError, not_found: ObservationError) -> ObservationError {
    match e.status() {
        Some(401) => ObservationError::Unauthorised,
        Some(404) => not_found,
        _ => ObservationError::Internal(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_mapping() {
        assert!(matches!(
            map_client_error(ClientError::ErrorStatus(401), ObservationError::DatasetNotFound),
            ObservationError::Unauthorised
        ));
        assert!(matches!(
            map_client_error(ClientError::ErrorStatus(404), ObservationError::VersionNotFound),
            ObservationError::VersionNotFound
        ));
        assert!(matches!(
            map_client_error(ClientError::ErrorStatus(503), ObservationError::DatasetNotFound),
            ObservationError::Internal(_)
        ));
    }
}
