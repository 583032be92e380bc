//! Row stream consumption: CSV rows in, typed observations out.
//!
//! One streaming read is opened per request. The first row is the header;
//! its first cell declares how many metadata columns sit between the value
//! column and the first dimension code/label pair, as `<prefix>_<count>`.
//! The stream is closed on every exit path, success or failure.

use std::collections::HashMap;

use crate::clients::{RowStream, StoreError, StreamingStore};
use crate::errors::ObservationError;
use crate::models::dataset::Version;
use crate::models::observation::{DimensionObject, Observation};
use crate::query::filter::DimensionFilter;

/// Store message substring signalling an empty result set.
const NO_RESULTS_MESSAGE: &str = "the filter options created no results";

/// Stream and parse all observation rows matched by `filter`.
pub async fn stream_observations(
    store: &dyn StreamingStore,
    version: &Version,
    filter: &DimensionFilter,
    wildcard: Option<&str>,
    limit: usize,
) -> Result<Vec<Observation>, ObservationError> {
    let mut rows = store
        .stream_csv_rows(&version.id, "", filter, limit)
        .await
        .map_err(map_store_error)?;

    let result = consume_rows(rows.as_mut(), version, wildcard).await;

    if let Err(e) = rows.close().await {
        tracing::warn!(error = %e, "failed to close row stream");
    }

    result
}

async fn consume_rows(
    rows: &mut dyn RowStream,
    version: &Version,
    wildcard: Option<&str>,
) -> Result<Vec<Observation>, ObservationError> {
    let header_row = rows
        .read()
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| ObservationError::Internal("row stream ended before header row".into()))?;
    let header = parse_csv_row(&header_row)?;
    let dimension_offset = header_dimension_offset(&header)?;

    let mut observations = Vec::new();
    loop {
        let row = match rows.read().await {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => return Err(map_store_error(e)),
        };

        let record = parse_csv_row(&row)?;
        observations.push(build_observation(
            version,
            &record,
            &header,
            dimension_offset,
            wildcard,
        ));
    }

    Ok(observations)
}

fn map_store_error(e: StoreError) -> ObservationError {
    if e.to_string().contains(NO_RESULTS_MESSAGE) {
        ObservationError::ObservationsNotFound
    } else {
        ObservationError::Internal(e.to_string())
    }
}

fn parse_csv_row(row: &str) -> Result<Vec<String>, ObservationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(row.as_bytes());
    let record = reader
        .records()
        .next()
        .ok_or_else(|| ObservationError::Internal(format!("empty CSV row: {row:?}")))?
        .map_err(|e| ObservationError::Internal(format!("unparsable CSV row {row:?}: {e}")))?;
    Ok(record.iter().map(str::to_string).collect())
}

/// Extract the metadata column count from the header's first cell
/// (`<prefix>_<integer>`).
pub fn header_dimension_offset(header: &[String]) -> Result<usize, ObservationError> {
    let first = header
        .first()
        .ok_or_else(|| ObservationError::MalformedHeader("empty header row".into()))?;

    let suffix = first.split('_').nth(1).ok_or_else(|| {
        ObservationError::MalformedHeader(format!("no metadata offset in first cell {first:?}"))
    })?;

    suffix.parse().map_err(|e| {
        ObservationError::MalformedHeader(format!(
            "metadata offset {suffix:?} in first cell {first:?} is not an integer: {e}"
        ))
    })
}

fn build_observation(
    version: &Version,
    record: &[String],
    header: &[String],
    dimension_offset: usize,
    wildcard: Option<&str>,
) -> Observation {
    let mut observation = Observation {
        observation: record.first().cloned().unwrap_or_default(),
        ..Observation::default()
    };

    if dimension_offset != 0 {
        let mut metadata = HashMap::new();
        for i in 1..=dimension_offset {
            if let (Some(key), Some(value)) = (header.get(i), record.get(i)) {
                metadata.insert(key.clone(), value.clone());
            }
        }
        observation.metadata = Some(metadata);
    }

    if let Some(wildcard) = wildcard {
        let mut dimensions = HashMap::new();

        // Label columns start two cells after the metadata block; each is
        // preceded by its code column.
        let mut i = dimension_offset + 2;
        while i < record.len() && i < header.len() {
            if header[i].eq_ignore_ascii_case(wildcard) {
                let code_list = version
                    .dimensions
                    .iter()
                    .flatten()
                    .find(|d| d.name.eq_ignore_ascii_case(wildcard));
                if let Some(dimension) = code_list {
                    let code = &record[i - 1];
                    dimensions.insert(
                        header[i].clone(),
                        DimensionObject {
                            href: format!("{}/codes/{}", dimension.href, code),
                            id: code.clone(),
                            label: record[i].clone(),
                        },
                    );
                }
                break;
            }
            i += 2;
        }

        // An unmatched wildcard leaves the field out entirely rather than
        // serializing an empty map.
        if !dimensions.is_empty() {
            observation.dimensions = Some(dimensions);
        }
    }

    observation
}
