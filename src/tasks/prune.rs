//! Prune task - deletes stale Pushgateway groupings on a fixed cadence

use crate::client::PushgatewayClient;
use crate::pruner::prune;
use crate::stats::Stats;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Background task that runs one prune cycle every `interval`.
///
/// The first cycle starts one full interval after launch. A failed cycle is
/// logged and the next tick proceeds as usual. Returns once `shutdown` is
/// cancelled; a cycle already in flight is allowed to finish.
pub async fn prune_task(
    client: PushgatewayClient,
    interval: Duration,
    threshold: Duration,
    stats: Arc<Stats>,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        interval_secs = interval.as_secs_f64(),
        threshold_secs = threshold.as_secs_f64(),
        "Prune task started"
    );

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let span = info_span!("prune_cycle", cycle_id = %Uuid::new_v4());
        match prune(&client, threshold).instrument(span).await {
            Ok(report) => stats.record_report(&report),
            Err(e) => {
                stats.record_failed_cycle();
                error!(error = %e, "Prune cycle failed");
            }
        }
    }

    info!("Prune task stopped");
}
