//! Deletes a single stale grouping from the Pushgateway

use crate::client::PushgatewayClient;
use crate::error::PruneError;
use crate::models::{DeleteOutcome, DeleteTarget, GroupingRecord};
use tracing::{debug, info, warn};

/// Work out where a grouping lives.
///
/// The grouping is addressed by `job` plus the first non-job label in
/// label-block order. Returns `Ok(None)` when that label's value is empty or
/// missing, in which case nothing should be deleted.
pub fn delete_target(grouping: &GroupingRecord) -> Result<Option<DeleteTarget>, PruneError> {
    let labels = &grouping.labels;

    // Usually "instance"
    let Some(label) = labels.first_non_job() else {
        return Err(PruneError::MissingDiscriminatingLabel {
            job: labels.job().unwrap_or_default().to_string(),
        });
    };
    let job = match labels.job() {
        Some(job) if !job.is_empty() => job,
        _ => return Err(PruneError::MissingJobLabel),
    };

    match label.value.as_deref() {
        Some(value) if !value.is_empty() => Ok(Some(DeleteTarget {
            job: job.to_string(),
            label: label.name.clone(),
            value: value.to_string(),
        })),
        _ => Ok(None),
    }
}

/// Delete one grouping and report what happened. Never fails the caller.
pub async fn delete_grouping(
    client: &PushgatewayClient,
    grouping: &GroupingRecord,
) -> DeleteOutcome {
    debug!(
        grouping = %serde_json::to_string(grouping).unwrap_or_default(),
        "Deleting grouping"
    );

    let target = match delete_target(grouping) {
        Ok(Some(target)) => target,
        Ok(None) => {
            let job = grouping.labels.job().map(str::to_string);
            let label = grouping
                .labels
                .first_non_job()
                .map(|label| label.name.clone())
                .unwrap_or_default();
            warn!(
                job = job.as_deref().unwrap_or_default(),
                label = %label,
                "Did not delete grouping because the label value is empty"
            );
            return DeleteOutcome::Skipped { job, label };
        }
        Err(e) => return DeleteOutcome::Failed(e),
    };

    match client.delete_grouping(&target).await {
        Ok(status) => {
            debug!(grouping = %target, status = status.as_u16(), "DELETE succeeded");
            info!(
                job = %target.job,
                label = %target.label,
                value = %target.value,
                "Deleted grouping"
            );
            DeleteOutcome::Deleted(target)
        }
        Err(cause) => DeleteOutcome::Failed(PruneError::DeleteFailed {
            url: client.delete_url(&target).to_string(),
            cause,
        }),
    }
}
