//! Sync scheduler - repeats reconciliation passes on a fixed interval
//!
//! The [`SyncScheduler`] owns the driver loop: announce the pass to the
//! action sink, run the [`Reconciler`], sleep, repeat. Passes never overlap;
//! the sleep starts after a pass ends.
//!
//! ## Flow
//!
//! ```text
//! ┌─> on_pass_start ──> Reconciler::synchronize ──> sleep(interval) ─┐
//! └───────────────────────────────────────────────────────────────────┘
//!                         CancellationToken ──> stop after current pass
//! ```
//!
//! A failed pass is logged and retried on the next tick; it never stops the
//! loop. Shutdown is cooperative: cancelling the token interrupts the sleep
//! but lets a running pass finish.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use dirmirror_core::domain::report::PassReport;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::engine::Reconciler;

/// Converts a user-facing interval in minutes into a sleep duration
///
/// # Errors
/// Rejects negative, zero, NaN and infinite values.
pub fn interval_from_minutes(minutes: f64) -> anyhow::Result<Duration> {
    if minutes.is_nan() || minutes <= 0.0 {
        anyhow::bail!("interval must be a positive number of minutes, got {minutes}");
    }
    Duration::try_from_secs_f64(minutes * 60.0)
        .map_err(|e| anyhow::anyhow!("interval of {minutes} minutes is out of range: {e}"))
}

/// Totals across all passes run by a scheduler
#[derive(Debug, Clone, Default)]
pub struct SchedulerSummary {
    /// Passes started (successful or not)
    pub passes: u64,
    /// Passes that ended with an error
    pub failed_passes: u64,
    /// Actions applied across all successful passes
    pub actions: usize,
    /// Report of the most recent successful pass
    pub last_report: Option<PassReport>,
}

// ============================================================================
// SyncScheduler
// ============================================================================

/// Runs a [`Reconciler`] for one Source/Target pair until cancelled
pub struct SyncScheduler {
    reconciler: Arc<Reconciler>,
    source: PathBuf,
    target: PathBuf,
    interval: Duration,
    shutdown: CancellationToken,
    max_passes: Option<u64>,
}

impl SyncScheduler {
    /// Creates a scheduler that runs until `shutdown` is cancelled
    pub fn new(
        reconciler: Arc<Reconciler>,
        source: PathBuf,
        target: PathBuf,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        info!(
            source = %source.display(),
            target = %target.display(),
            interval_secs = interval.as_secs_f64(),
            "Creating sync scheduler"
        );

        Self {
            reconciler,
            source,
            target,
            interval,
            shutdown,
            max_passes: None,
        }
    }

    /// Stops the loop after `passes` passes even without cancellation
    pub fn with_max_passes(mut self, passes: u64) -> Self {
        self.max_passes = Some(passes);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Main loop
    ///
    /// Returns when the shutdown token is cancelled (after the running pass
    /// completes) or when the pass limit is reached.
    pub async fn run(&self) -> SchedulerSummary {
        info!("Sync scheduler starting");
        let mut summary = SchedulerSummary::default();

        loop {
            if self.shutdown.is_cancelled() {
                info!("Shutdown requested before pass");
                break;
            }

            self.reconciler.sink().on_pass_start(Local::now()).await;

            let pass_id = Uuid::new_v4();
            let span = tracing::info_span!("pass", id = %pass_id, number = summary.passes + 1);

            match self
                .reconciler
                .synchronize(&self.source, &self.target)
                .instrument(span)
                .await
            {
                Ok(report) => {
                    info!(
                        pass = %pass_id,
                        created = report.created(),
                        modified = report.modified(),
                        removed = report.removed(),
                        missing_sources = report.missing_sources.len(),
                        duration_ms = report.duration_ms,
                        "Sync pass completed"
                    );
                    summary.actions += report.actions.len();
                    summary.last_report = Some(report);
                }
                Err(e) => {
                    let err_msg = format!("{e:#}");
                    error!(pass = %pass_id, error = %err_msg, "Sync pass failed; retrying on next tick");
                    summary.failed_passes += 1;
                }
            }
            summary.passes += 1;

            if self.max_passes.is_some_and(|max| summary.passes >= max) {
                info!(passes = summary.passes, "Pass limit reached");
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(
            passes = summary.passes,
            failed = summary.failed_passes,
            "Sync scheduler stopped"
        );
        summary
    }
}

// ============================================================================
// Unit tests
// ============================================================================
