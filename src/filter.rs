//! Selects groupings that have not been pushed recently

use crate::models::GroupingRecord;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

/// Return the groupings strictly older than `threshold` at `now`, in input order.
///
/// A grouping exactly `threshold` old is kept. Records without a timestamp
/// are never stale.
pub fn filter_stale<'a>(
    groupings: &'a [GroupingRecord],
    threshold: Duration,
    now: DateTime<Utc>,
) -> Vec<&'a GroupingRecord> {
    let stale: Vec<&GroupingRecord> = groupings
        .iter()
        .filter(|grouping| is_stale(grouping, threshold, now))
        .collect();

    for grouping in &stale {
        debug!(
            grouping = %serde_json::to_string(grouping).unwrap_or_default(),
            "Stale grouping"
        );
    }

    stale
}

fn is_stale(grouping: &GroupingRecord, threshold: Duration, now: DateTime<Utc>) -> bool {
    let Some(pushed_at) = grouping.timestamp else {
        return false;
    };
    let age_ms = now.timestamp_millis().saturating_sub(pushed_at.timestamp_millis());
    age_ms > 0 && age_ms as u128 > threshold.as_millis()
}
