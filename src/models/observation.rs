//! The observations response document and its assembly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::dataset::{DatasetDetails, LinkObject, UsageNote, Version};
use crate::query::filter::WILDCARD;

/// Observations matching a set of dimension selections on one version.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObservationsDoc {
    /// One code-list link per non-wildcard selector.
    pub dimensions: HashMap<String, DimensionOption>,

    pub limit: usize,

    pub links: ObservationLinks,

    pub observations: Vec<Observation>,

    pub offset: usize,

    pub total_observations: usize,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit_of_measure: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_notes: Option<Vec<UsageNote>>,
}

/// Code-list link for one selected dimension option.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DimensionOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<LinkObject>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObservationLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_metadata: Option<LinkObject>,

    #[serde(default, rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<LinkObject>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<LinkObject>,
}

/// A single data cell plus its row-level context.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Observation {
    /// Present only when a wildcard dimension is active; keyed by the CSV
    /// header cell of the matched label column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<HashMap<String, DimensionObject>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,

    pub observation: String,
}

/// The dimension option that produced an observation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct DimensionObject {
    pub href: String,
    pub id: String,
    pub label: String,
}

/// Merge dataset and version metadata with the parsed observation list into
/// the final response document.
pub fn build_observations_doc(
    raw_query: &str,
    version: &Version,
    dataset: &DatasetDetails,
    observations: Vec<Observation>,
    query_parameters: &HashMap<String, String>,
    offset: usize,
    limit: usize,
) -> ObservationsDoc {
    let version_url = &version.links.version.href;

    let mut dimensions = HashMap::new();
    for (name, value) in query_parameters {
        if value == WILDCARD {
            continue;
        }
        let Some(dimension) = version
            .dimensions
            .iter()
            .flatten()
            .find(|d| d.name.eq_ignore_ascii_case(name))
        else {
            continue;
        };
        dimensions.insert(
            name.clone(),
            DimensionOption {
                option: Some(LinkObject {
                    href: format!("{}/codes/{}", dimension.href, value),
                    id: value.clone(),
                }),
            },
        );
    }

    ObservationsDoc {
        dimensions,
        limit,
        links: ObservationLinks {
            dataset_metadata: Some(LinkObject {
                href: format!("{version_url}/metadata"),
                id: String::new(),
            }),
            self_link: Some(LinkObject {
                href: format!("{version_url}/observations?{raw_query}"),
                id: String::new(),
            }),
            version: Some(LinkObject {
                href: version_url.clone(),
                id: version.links.version.id.clone(),
            }),
        },
        total_observations: observations.len(),
        observations,
        offset,
        unit_of_measure: dataset.unit_of_measure.clone(),
        usage_notes: dataset.usage_notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dataset::{VersionDimension, VersionLinks};

    fn version_fixture() -> Version {
        Version {
            id: "ab12cd34".to_string(),
            state: "published".to_string(),
            dimensions: Some(vec![
                VersionDimension {
                    name: "geography".to_string(),
                    href: "http://localhost:22400/code-lists/geography".to_string(),
                },
                VersionDimension {
                    name: "time".to_string(),
                    href: "http://localhost:22400/code-lists/time".to_string(),
                },
            ]),
            links: VersionLinks {
                version: LinkObject {
                    href: "http://localhost:22000/datasets/cpih/editions/2017/versions/1"
                        .to_string(),
                    id: "1".to_string(),
                },
            },
        }
    }

    #[test]
    fn test_doc_links_and_totals() {
        let query: HashMap<String, String> = [
            ("geography".to_string(), "K02000001".to_string()),
            ("time".to_string(), WILDCARD.to_string()),
        ]
        .into();

        let doc = build_observations_doc(
            "geography=K02000001&time=*",
            &version_fixture(),
            &DatasetDetails::default(),
            vec![Observation::default(), Observation::default()],
            &query,
            0,
            10_000,
        );

        assert_eq!(doc.total_observations, 2);
        assert_eq!(doc.limit, 10_000);
        assert_eq!(doc.offset, 0);
        assert_eq!(
            doc.links.self_link.unwrap().href,
            "http://localhost:22000/datasets/cpih/editions/2017/versions/1/observations?geography=K02000001&time=*"
        );
        assert_eq!(
            doc.links.dataset_metadata.unwrap().href,
            "http://localhost:22000/datasets/cpih/editions/2017/versions/1/metadata"
        );
        assert_eq!(doc.links.version.unwrap().id, "1");
    }

    #[test]
    fn test_wildcard_selector_gets_no_dimension_link() {
        let query: HashMap<String, String> = [
            ("geography".to_string(), "K02000001".to_string()),
            ("time".to_string(), WILDCARD.to_string()),
        ]
        .into();

        let doc = build_observations_doc(
            "",
            &version_fixture(),
            &DatasetDetails::default(),
            vec![],
            &query,
            0,
            100,
        );

        assert_eq!(doc.dimensions.len(), 1);
        let option = doc.dimensions["geography"].option.as_ref().unwrap();
        assert_eq!(option.id, "K02000001");
        assert_eq!(
            option.href,
            "http://localhost:22400/code-lists/geography/codes/K02000001"
        );
        assert!(!doc.dimensions.contains_key("time"));
    }

    #[test]
    fn test_empty_optionals_are_omitted_from_json() {
        let doc = ObservationsDoc::default();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("unit_of_measure").is_none());
        assert!(json.get("usage_notes").is_none());
        assert!(json.get("total_observations").is_some());
    }
}
