//! Pushgateway pruner - deletes groupings that stopped being pushed

use anyhow::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use pushgateway_pruner::client::PushgatewayClient;
use pushgateway_pruner::config::Config;
use pushgateway_pruner::stats::Stats;
use pushgateway_pruner::tasks::prune;
use pushgateway_pruner::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration
    let config = Config::from_env().context("Invalid configuration")?;

    // Initialize tracing
    telemetry::init(config.debug);

    info!("Pushgateway pruner v{} starting", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let client = PushgatewayClient::new(config.pushgateway_url.clone(), config.request_timeout)
        .context("Failed to create Pushgateway client")?;
    let stats = Arc::new(Stats::new());
    let shutdown = CancellationToken::new();

    // Prune task - deletes stale groupings every PRUNE_INTERVAL
    let task = tokio::spawn(prune::prune_task(
        client,
        config.prune_interval,
        config.prune_threshold,
        Arc::clone(&stats),
        shutdown.clone(),
    ));

    shutdown_signal().await;
    info!("Shutdown signal received, waiting for the current cycle to finish");
    shutdown.cancel();
    task.await.context("Prune task panicked")?;

    let snapshot = stats.snapshot();
    info!(
        cycles = snapshot.cycles_total,
        failed_cycles = snapshot.cycles_failed_total,
        deleted = snapshot.groupings_deleted_total,
        skipped = snapshot.groupings_skipped_total,
        failed = snapshot.groupings_failed_total,
        last_cycle = %serde_json::to_string(&snapshot.last_cycle).unwrap_or_default(),
        "Pushgateway pruner stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
