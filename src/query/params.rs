//! Query parameter validation.
//!
//! # Responsibilities
//! - Parse the raw query string into multi-valued pairs
//! - Normalize dimension names (lower-case, case-insensitive matching)
//! - Reject unknown, multi-valued, and missing dimensions, in that order
//!
//! # Design Decisions
//! - Offending name lists are sorted so error messages are deterministic
//! - Exactly one of the three validation errors is reported per request

use std::collections::HashMap;

use crate::errors::ObservationError;

/// Decode a raw query string into ordered (key, value) pairs.
pub fn parse_raw_query(raw_query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw_query.as_bytes())
        .into_owned()
        .collect()
}

/// Validate the supplied selectors against the version's dimension names and
/// build the per-dimension value map, keyed by lower-cased dimension name.
///
/// `valid_dimensions` must already be lower-cased.
pub fn extract_query_parameters(
    query: &[(String, String)],
    valid_dimensions: &[String],
) -> Result<HashMap<String, String>, ObservationError> {
    let mut parameters: HashMap<String, String> = HashMap::new();
    let mut value_counts: HashMap<String, usize> = HashMap::new();
    let mut incorrect: Vec<String> = Vec::new();

    for (raw_name, value) in query {
        let name = raw_name.to_lowercase();

        if !valid_dimensions.contains(&name) {
            incorrect.push(name);
            continue;
        }

        *value_counts.entry(name.clone()).or_insert(0) += 1;
        parameters.insert(name, value.clone());
    }

    if !incorrect.is_empty() {
        incorrect.sort();
        incorrect.dedup();
        return Err(ObservationError::IncorrectQueryParameters(incorrect));
    }

    // Differently-cased keys for the same dimension count as multiple values.
    let mut multivalued: Vec<String> = value_counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(name, _)| name)
        .collect();
    if !multivalued.is_empty() {
        multivalued.sort();
        return Err(ObservationError::MultivaluedQueryParameters(multivalued));
    }

    if parameters.len() != valid_dimensions.len() {
        let mut missing: Vec<String> = valid_dimensions
            .iter()
            .filter(|name| !parameters.contains_key(*name))
            .cloned()
            .collect();
        missing.sort();
        return Err(ObservationError::MissingQueryParameters(missing));
    }

    Ok(parameters)
}
