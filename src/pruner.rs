//! One prune cycle: fetch, parse, filter, delete

use crate::client::PushgatewayClient;
use crate::deleter::delete_grouping;
use crate::error::{PruneError, Result};
use crate::filter::filter_stale;
use crate::models::{DeleteOutcome, PruneReport};
use crate::parser::parse_groupings;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::time::Duration;
use tracing::{error, info};

/// Run a prune cycle against the current time
pub async fn prune(client: &PushgatewayClient, threshold: Duration) -> Result<PruneReport> {
    prune_at(client, threshold, Utc::now()).await
}

/// Run a prune cycle, judging staleness against `now`.
///
/// Only the metrics fetch can fail the cycle. Deletions run concurrently and
/// each one's result lands in the report, in exposition order.
pub async fn prune_at(
    client: &PushgatewayClient,
    threshold: Duration,
    now: DateTime<Utc>,
) -> Result<PruneReport> {
    info!("Starting prune process...");

    let metrics = client
        .fetch_metrics()
        .await
        .map_err(|cause| PruneError::FetchFailed {
            url: client.metrics_url().to_string(),
            cause,
        })?;

    let groupings = parse_groupings(&metrics);
    let stale = filter_stale(&groupings, threshold, now);
    info!(
        "Found {} grouping(s), of which {} will be pruned",
        groupings.len(),
        stale.len()
    );

    let outcomes = join_all(stale.iter().map(|grouping| delete_grouping(client, grouping))).await;
    for outcome in &outcomes {
        if let DeleteOutcome::Failed(e) = outcome {
            error!(error = %e, "Pruning grouping failed");
        }
    }

    let report = PruneReport {
        found: groupings.len(),
        stale: stale.len(),
        outcomes,
    };
    info!(
        deleted = report.deleted(),
        skipped = report.skipped(),
        failed = report.failed(),
        "Pruning process finished"
    );
    Ok(report)
}
