//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, probe concurrency > 0)
//! - Validate upstream URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: Config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::Config;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("dataset_api_url", &config.dataset_api_url),
        ("graph_api_url", &config.graph_api_url),
    ] {
        if let Err(e) = Url::parse(value) {
            errors.push(ValidationError {
                field,
                message: format!("invalid URL {value:?}: {e}"),
            });
        }
    }

    if config.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "bind_address",
            message: format!("not a socket address: {:?}", config.bind_address),
        });
    }

    if config.default_observation_limit == 0 {
        errors.push(ValidationError {
            field: "default_observation_limit",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.cardinality.concurrency == 0 {
        errors.push(ValidationError {
            field: "cardinality.concurrency",
            message: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
