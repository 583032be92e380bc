//! Dimension cardinality sorter.
//!
//! # Responsibilities
//! - Probe the option count of every filter dimension concurrently
//! - Reorder the filter descending by estimated cardinality, so the backing
//!   store applies the most constraining axis first
//! - Degrade to a static geography-first ordering when probes fail
//!
//! # Concurrency
//! Probes run under a counting semaphore (width from config). Once more
//! than `failure_threshold` probes have failed, no further probes are
//! launched, but in-flight probes are never cancelled; everything started is
//! joined before the real-vs-fallback decision is made.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::clients::DatasetClient;
use crate::config::CardinalityConfig;
use crate::query::filter::DimensionFilter;
use crate::query::VersionTarget;

/// Artificial size assigned to "geography" in the fallback ordering. It is
/// typically the largest dimension, so it keeps sorting first even without
/// real counts.
const FALLBACK_GEOGRAPHY_SIZE: usize = 999_999;

/// Reorder `filter` in place, largest estimated cardinality first.
///
/// Only the order of dimensions changes; membership and multiplicity are
/// preserved. Filters with at most one dimension are left untouched and no
/// probes are launched for them.
pub async fn sort_filter(
    client: Arc<dyn DatasetClient>,
    config: CardinalityConfig,
    target: &VersionTarget,
    filter: &mut DimensionFilter,
) {
    let dimension_count = filter.dimensions.len();
    if dimension_count <= 1 {
        return;
    }

    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let sizes: Arc<Mutex<Vec<(usize, usize)>>> =
        Arc::new(Mutex::new(Vec::with_capacity(dimension_count)));
    let failures = Arc::new(AtomicU32::new(0));
    let mut probes = JoinSet::new();

    for (index, dimension) in filter.dimensions.iter().enumerate() {
        if failures.load(Ordering::SeqCst) > config.failure_threshold {
            break;
        }

        // Blocks while the pool is full, bounding outbound probes.
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let client = Arc::clone(&client);
        let sizes = Arc::clone(&sizes);
        let failures = Arc::clone(&failures);
        let target = target.clone();
        let name = dimension.name.clone();

        probes.spawn(async move {
            let _permit = permit;
            match client
                .get_option_count(&target.dataset_id, &target.edition, &target.version, &name)
                .await
            {
                Ok(count) => sizes.lock().await.push((index, count)),
                Err(e) => {
                    let failed = failures.fetch_add(1, Ordering::SeqCst) + 1;
                    // Log only the first few of possibly hundreds; fixing
                    // one tends to fix them all.
                    if failed <= config.failure_threshold {
                        tracing::warn!(
                            dataset_id = %target.dataset_id,
                            dimension = %name,
                            error = %e,
                            "cardinality probe failed"
                        );
                    }
                }
            }
        });
    }

    // Join everything started, including probes in flight when the failure
    // threshold was crossed.
    while probes.join_next().await.is_some() {}

    let mut sizes = std::mem::take(&mut *sizes.lock().await);

    let failure_count = failures.load(Ordering::SeqCst);
    if failure_count != 0 {
        tracing::info!(
            dataset_id = %target.dataset_id,
            failures = failure_count,
            "cardinality probes failed, sorting by default of geography first"
        );
        // Static fallback: geography gets an artificially large size;
        // everything else decreases by original position, preserving the
        // original relative order.
        sizes.clear();
        for (index, dimension) in filter.dimensions.iter().enumerate() {
            let size = if dimension.name.eq_ignore_ascii_case("geography") {
                FALLBACK_GEOGRAPHY_SIZE
            } else {
                dimension_count - index
            };
            sizes.push((index, size));
        }
    }

    sizes.sort_by(|a, b| b.1.cmp(&a.1));
    let reordered = sizes
        .iter()
        .map(|&(index, _)| filter.dimensions[index].clone())
        .collect();
    filter.dimensions = reordered;
}
