//! Running totals across prune cycles

use crate::models::PruneReport;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-lifetime prune counters
#[derive(Default)]
pub struct Stats {
    cycles_total: AtomicU64,
    cycles_failed_total: AtomicU64,
    groupings_found_total: AtomicU64,
    groupings_deleted_total: AtomicU64,
    groupings_skipped_total: AtomicU64,
    groupings_failed_total: AtomicU64,
    last_cycle: RwLock<Option<CycleSummary>>,
}

/// What the most recent successful cycle did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub finished_at: DateTime<Utc>,
    pub found: usize,
    pub stale: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_report(&self, report: &PruneReport) {
        let summary = CycleSummary {
            finished_at: Utc::now(),
            found: report.found,
            stale: report.stale,
            deleted: report.deleted(),
            skipped: report.skipped(),
            failed: report.failed(),
        };

        self.cycles_total.fetch_add(1, Ordering::Relaxed);
        self.groupings_found_total.fetch_add(summary.found as u64, Ordering::Relaxed);
        self.groupings_deleted_total.fetch_add(summary.deleted as u64, Ordering::Relaxed);
        self.groupings_skipped_total.fetch_add(summary.skipped as u64, Ordering::Relaxed);
        self.groupings_failed_total.fetch_add(summary.failed as u64, Ordering::Relaxed);
        *self.last_cycle.write() = Some(summary);
    }

    /// Count a cycle that aborted before deleting anything
    pub fn record_failed_cycle(&self) {
        self.cycles_total.fetch_add(1, Ordering::Relaxed);
        self.cycles_failed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles_total: self.cycles_total.load(Ordering::Relaxed),
            cycles_failed_total: self.cycles_failed_total.load(Ordering::Relaxed),
            groupings_found_total: self.groupings_found_total.load(Ordering::Relaxed),
            groupings_deleted_total: self.groupings_deleted_total.load(Ordering::Relaxed),
            groupings_skipped_total: self.groupings_skipped_total.load(Ordering::Relaxed),
            groupings_failed_total: self.groupings_failed_total.load(Ordering::Relaxed),
            last_cycle: self.last_cycle.read().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub cycles_total: u64,
    pub cycles_failed_total: u64,
    pub groupings_found_total: u64,
    pub groupings_deleted_total: u64,
    pub groupings_skipped_total: u64,
    pub groupings_failed_total: u64,
    pub last_cycle: Option<CycleSummary>,
}
