//! Error taxonomy for the observation query pipeline.
//!
//! Every stage of the pipeline maps its failures into [`ObservationError`],
//! which carries the HTTP status the transport layer should respond with.
//! Anything in the 500 class is rendered with a single generic message; the
//! real cause is logged before coercion so internals never leak to callers.

use axum::http::StatusCode;
use thiserror::Error;

/// Message returned for every 500-class failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// Errors that can occur while answering an observations query.
#[derive(Debug, Error)]
pub enum ObservationError {
    /// Query parameters named dimensions that do not exist on this version.
    #[error("incorrect selection of query parameters: [{}], these dimensions do not exist for this version of the dataset", .0.join(", "))]
    IncorrectQueryParameters(Vec<String>),

    /// A valid dimension was not supplied at all.
    #[error("missing query parameters for the following dimensions: [{}]", .0.join(", "))]
    MissingQueryParameters(Vec<String>),

    /// A dimension was supplied with more than one value.
    #[error("multi-valued query parameters for the following dimensions: [{}]", .0.join(", "))]
    MultivaluedQueryParameters(Vec<String>),

    /// More than one dimension selected with the wildcard value.
    #[error("only one wildcard (*) is allowed as a value in selected query parameters")]
    TooManyWildcards,

    #[error("dataset not found")]
    DatasetNotFound,

    /// The dataset API serves editions and versions through one combined
    /// fetch, and reports a missing edition on that path as a missing
    /// version, so the pipeline never constructs this variant itself. It
    /// stays in the not-found vocabulary for callers embedding this crate.
    #[error("edition not found")]
    EditionNotFound,

    #[error("version not found")]
    VersionNotFound,

    /// The filter matched no rows in the backing store.
    #[error("no observations found")]
    ObservationsNotFound,

    /// A resolved document carried a state string we do not recognize.
    #[error("incorrect resource state: {0}")]
    InvalidResourceState(String),

    /// The version document carried no dimension list. Upstream schema
    /// violation, not a caller error.
    #[error("missing list of dimensions from version doc")]
    MissingVersionDimensions,

    /// The CSV header row did not declare a parsable metadata offset.
    #[error("malformed header row: {0}")]
    MalformedHeader(String),

    /// Upstream rejected our credentials. Never surfaced as 401 to callers.
    #[error("unauthorised")]
    Unauthorised,

    /// Catch-all for upstream and I/O failures.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ObservationError {
    /// HTTP status the transport layer should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::IncorrectQueryParameters(_)
            | Self::MissingQueryParameters(_)
            | Self::MultivaluedQueryParameters(_)
            | Self::TooManyWildcards => StatusCode::BAD_REQUEST,

            Self::DatasetNotFound
            | Self::EditionNotFound
            | Self::VersionNotFound
            | Self::ObservationsNotFound => StatusCode::NOT_FOUND,

            Self::InvalidResourceState(_)
            | Self::MissingVersionDimensions
            | Self::MalformedHeader(_)
            | Self::Unauthorised
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message body for the response. 500-class errors all collapse to one
    /// generic message so upstream details never reach callers.
    pub fn response_message(&self) -> String {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_requests() {
        let err = ObservationError::IncorrectQueryParameters(vec!["agee".into(), "tiime".into()]);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.response_message().contains("agee, tiime"));

        assert_eq!(
            ObservationError::TooManyWildcards.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_class() {
        for err in [
            ObservationError::DatasetNotFound,
            ObservationError::EditionNotFound,
            ObservationError::VersionNotFound,
            ObservationError::ObservationsNotFound,
        ] {
            assert_eq!(err.status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_internal_class_never_leaks_cause() {
        let err = ObservationError::Internal("neptune exploded at 03:00".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response_message(), INTERNAL_ERROR_MESSAGE);

        let err = ObservationError::MalformedHeader("no underscore in v4".into());
        assert_eq!(err.response_message(), INTERNAL_ERROR_MESSAGE);

        // Unauthorised is passthrough: a 500, never a 401/403.
        assert_eq!(
            ObservationError::Unauthorised.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
