//! Dimension filter construction.

use std::collections::HashMap;

use serde::Serialize;

use crate::errors::ObservationError;

/// Query value selecting every option of a dimension.
pub const WILDCARD: &str = "*";

/// Ordered dimension filter passed to the backing store. The cardinality
/// sorter permutes `dimensions`; membership never changes after build.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DimensionFilter {
    pub dimensions: Vec<FilterDimension>,
}

/// One filtered dimension with its selected option values.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilterDimension {
    pub name: String,
    pub options: Vec<String>,
}

/// Convert the validated parameter map into a filter, extracting the single
/// wildcard dimension if present.
pub fn build_filter(
    query_parameters: &HashMap<String, String>,
) -> Result<(DimensionFilter, Option<String>), ObservationError> {
    let mut filter = DimensionFilter::default();
    let mut wildcard: Option<String> = None;

    for (dimension, option) in query_parameters {
        if option == WILDCARD {
            if wildcard.is_some() {
                return Err(ObservationError::TooManyWildcards);
            }
            wildcard = Some(dimension.clone());
            continue;
        }

        filter.dimensions.push(FilterDimension {
            name: dimension.clone(),
            options: vec![option.clone()],
        });
    }

    Ok((filter, wildcard))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_single_wildcard_extracted() {
        let (filter, wildcard) = build_filter(&params(&[
            ("geography", "K02000001"),
            ("aggregate", "*"),
        ]))
        .unwrap();

        assert_eq!(wildcard.as_deref(), Some("aggregate"));
        assert_eq!(filter.dimensions.len(), 1);
        assert_eq!(filter.dimensions[0].name, "geography");
        assert_eq!(filter.dimensions[0].options, vec!["K02000001"]);
    }

    #[test]
    fn test_two_wildcards_rejected() {
        let err = build_filter(&params(&[
            ("geography", "*"),
            ("aggregate", "*"),
            ("time", "16-Aug"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ObservationError::TooManyWildcards));
    }

    #[test]
    fn test_no_wildcard() {
        let (filter, wildcard) =
            build_filter(&params(&[("geography", "K02000001"), ("time", "16-Aug")])).unwrap();
        assert!(wildcard.is_none());
        assert_eq!(filter.dimensions.len(), 2);
    }
}
