//! Core domain models for the pruner

use crate::error::PruneError;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Label that names the pushing job
pub const JOB_LABEL: &str = "job";

/// A single `name=value` pair from a label block.
///
/// `value` is `None` when the pair had no `=` at all, which keeps a
/// malformed line addressable as a record instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub value: Option<String>,
}

/// Label names mapped to values, in label-block order.
///
/// Names are unique. Re-inserting a name replaces its value but keeps the
/// position of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.labels.iter_mut().find(|label| label.name == name) {
            Some(existing) => existing.value = value,
            None => self.labels.push(Label { name, value }),
        }
    }

    /// Value of `name`, or `None` if the label is absent or has no value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|label| label.name == name)
            .and_then(|label| label.value.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label.name == name)
    }

    pub fn job(&self) -> Option<&str> {
        self.get(JOB_LABEL)
    }

    /// First label that is not `job`, in label-block order.
    ///
    /// This is the label a grouping is addressed by when deleting it. With
    /// more than one non-job label the choice depends purely on order.
    pub fn first_non_job(&self) -> Option<&Label> {
        self.labels.iter().find(|label| label.name != JOB_LABEL)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for (name, value) in iter {
            set.insert(name, Some(value.into()));
        }
        set
    }
}

impl Serialize for LabelSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.labels.len()))?;
        for label in &self.labels {
            map.serialize_entry(&label.name, &label.value)?;
        }
        map.end()
    }
}

/// One `push_time_seconds` sample: when a grouping was last pushed, and its labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingRecord {
    /// Last push time. `None` when the sample value was not a number.
    pub timestamp: Option<DateTime<Utc>>,
    pub labels: LabelSet,
}

impl GroupingRecord {
    pub fn new(timestamp: Option<DateTime<Utc>>, labels: LabelSet) -> Self {
        Self { timestamp, labels }
    }
}

/// Address of a grouping on the Pushgateway: `/metrics/job/{job}/{label}/{value}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteTarget {
    pub job: String,
    pub label: String,
    pub value: String,
}

impl fmt::Display for DeleteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job={} {}={}", self.job, self.label, self.value)
    }
}

/// Result of trying to delete one stale grouping
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(DeleteTarget),
    /// The discriminating label had an empty value, nothing was sent
    Skipped { job: Option<String>, label: String },
    Failed(PruneError),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DeleteOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DeleteOutcome::Failed(_))
    }
}

/// Summary of one prune cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PruneReport {
    /// Groupings found in the exposition text
    pub found: usize,
    /// Groupings older than the threshold
    pub stale: usize,
    /// One outcome per stale grouping, in exposition order
    pub outcomes: Vec<DeleteOutcome>,
}

impl PruneReport {
    pub fn deleted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_deleted()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut labels = LabelSet::new();
        labels.insert("instance", Some("a".to_string()));
        labels.insert("job", Some("batch".to_string()));
        labels.insert("instance", Some("b".to_string()));

        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("instance"), Some("b"));
        assert_eq!(labels.first_non_job().map(|l| l.name.as_str()), Some("instance"));
    }

    #[test]
    fn test_first_non_job_follows_order() {
        let labels: LabelSet = [("job", "batch"), ("zone", "eu"), ("instance", "host1")]
            .into_iter()
            .collect();

        assert_eq!(labels.job(), Some("batch"));
        assert_eq!(labels.first_non_job().map(|l| l.name.as_str()), Some("zone"));
    }

    #[test]
    fn test_first_non_job_none_for_job_only() {
        let labels: LabelSet = [("job", "batch")].into_iter().collect();
        assert!(labels.first_non_job().is_none());
    }

    #[test]
    fn test_missing_value_is_kept() {
        let mut labels = LabelSet::new();
        labels.insert("broken", None);

        assert!(labels.contains("broken"));
        assert_eq!(labels.get("broken"), None);
    }

    #[test]
    fn test_labels_serialize_as_map() {
        let labels: LabelSet = [("instance", "host1"), ("job", "batch")].into_iter().collect();
        let json = serde_json::to_string(&labels).unwrap();
        assert_eq!(json, r#"{"instance":"host1","job":"batch"}"#);
    }

    #[test]
    fn test_report_counts() {
        let report = PruneReport {
            found: 4,
            stale: 3,
            outcomes: vec![
                DeleteOutcome::Deleted(DeleteTarget {
                    job: "a".into(),
                    label: "instance".into(),
                    value: "1".into(),
                }),
                DeleteOutcome::Skipped {
                    job: Some("b".into()),
                    label: "instance".into(),
                },
                DeleteOutcome::Failed(PruneError::MissingDiscriminatingLabel { job: "c".into() }),
            ],
        };

        assert_eq!(report.deleted(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
    }
}
