//! Extracts grouping records from Prometheus text exposition
//!
//! Only the `push_time_seconds` family matters here. Every grouping on a
//! Pushgateway carries one such gauge, and its value is the last push time.

use crate::models::{GroupingRecord, LabelSet};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Metric family the Pushgateway stamps on every grouping
pub const PUSH_TIME_METRIC: &str = "push_time_seconds";

/// Parse every `push_time_seconds` line of an exposition payload.
///
/// Matching is a plain prefix test on the line. Comments, other families and
/// blank lines are ignored. Malformed lines still produce a record so that
/// later stages can reject them one by one.
pub fn parse_groupings(text: &str) -> Vec<GroupingRecord> {
    let groupings: Vec<GroupingRecord> = text
        .lines()
        .filter(|line| line.starts_with(PUSH_TIME_METRIC))
        .map(parse_line)
        .collect();

    for grouping in &groupings {
        debug!(
            grouping = %serde_json::to_string(grouping).unwrap_or_default(),
            "Parsed grouping"
        );
    }

    groupings
}

fn parse_line(line: &str) -> GroupingRecord {
    let (label_text, value_text) = split_line(line);
    GroupingRecord::new(parse_timestamp(value_text), parse_labels(label_text))
}

/// Split a sample line into its label block and the text after it
fn split_line(line: &str) -> (&str, &str) {
    match line.find('{') {
        Some(open) => {
            let rest = &line[open + 1..];
            match rest.find('}') {
                Some(close) => (&rest[..close], &rest[close + 1..]),
                None => (rest, ""),
            }
        }
        None => {
            let value = line
                .split_once(char::is_whitespace)
                .map(|(_, value)| value)
                .unwrap_or("");
            ("", value)
        }
    }
}

/// Sample value as Unix seconds, truncated to millisecond precision.
///
/// An optional trailing sample timestamp is ignored.
fn parse_timestamp(value_text: &str) -> Option<DateTime<Utc>> {
    let seconds: f64 = value_text.split_whitespace().next()?.parse().ok()?;
    let millis = (seconds * 1000.0).trunc();
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// Parse the inside of a label block, e.g. `instance="a",job="b"`.
///
/// Values lose one surrounding pair of double quotes and are otherwise kept
/// verbatim. A pair without `=` keeps its name with no value.
pub fn parse_labels(text: &str) -> LabelSet {
    let mut labels = LabelSet::new();
    if text.trim().is_empty() {
        debug!("no labels found");
        return labels;
    }

    for pair in text.split(',').filter(|pair| !pair.trim().is_empty()) {
        match pair.split_once('=') {
            Some((name, value)) => {
                labels.insert(name.trim(), Some(unquote(value.trim()).to_string()))
            }
            None => labels.insert(pair.trim(), None),
        }
    }
    labels
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}
