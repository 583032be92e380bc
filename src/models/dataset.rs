//! Documents returned by the dataset API.
//!
//! Only the fields the observation pipeline reads are modelled; the dataset
//! API returns more, and serde ignores the rest.

use serde::{Deserialize, Serialize};

/// State value gating visibility for unauthorised callers.
pub const STATE_PUBLISHED: &str = "published";

/// States a version document may legitimately carry once queryable.
const VALID_VERSION_STATES: &[&str] = &["edition-confirmed", "associated", "published"];

/// Returns true if `state` is a recognized version state.
pub fn is_valid_version_state(state: &str) -> bool {
    VALID_VERSION_STATES.contains(&state)
}

/// Dataset document, as returned by the dataset API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatasetDetails {
    #[serde(default)]
    pub state: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit_of_measure: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_notes: Option<Vec<UsageNote>>,
}

/// Version document, as returned by the dataset API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Version {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub state: String,

    /// Dimensions of this version. `None` is an upstream schema violation
    /// the resolver rejects.
    #[serde(default)]
    pub dimensions: Option<Vec<VersionDimension>>,

    #[serde(default)]
    pub links: VersionLinks,
}

/// One categorical axis of a dataset version.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VersionDimension {
    #[serde(default)]
    pub name: String,

    /// Code-list URL for this dimension.
    #[serde(default)]
    pub href: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VersionLinks {
    #[serde(default)]
    pub version: LinkObject,
}

/// A link with an optional resource id.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct LinkObject {
    #[serde(default)]
    pub href: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

/// Free-text note attached to a dataset.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct UsageNote {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_state_recognition() {
        assert!(is_valid_version_state("published"));
        assert!(is_valid_version_state("associated"));
        assert!(!is_valid_version_state("gone"));
        assert!(!is_valid_version_state(""));
    }

    #[test]
    fn test_version_deserializes_without_dimensions() {
        let version: Version =
            serde_json::from_str(r#"{"id": "v1", "state": "published"}"#).unwrap();
        assert!(version.dimensions.is_none());
    }
}
