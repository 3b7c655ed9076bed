//! Driver - wires adapters together and runs the scheduler
//!
//! 1. Resolves the log destination once (falls back with a warning)
//! 2. Builds the filesystem adapter, `ActionLog` and `Reconciler`
//! 3. Installs the SIGINT/SIGTERM handler
//! 4. Runs the `SyncScheduler` until cancelled, or for one pass with `--once`

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use dirmirror_audit::{ActionLog, LogDestination};
use dirmirror_core::ports::action_sink::IActionSink;
use dirmirror_sync::{
    engine::Reconciler, filesystem::LocalFileSystemAdapter, scheduler::SyncScheduler,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::output::{get_formatter, print_report, OutputFormat};
use crate::settings::Settings;

pub async fn run(settings: Settings, once: bool, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let destination = LogDestination::resolve(settings.log_destination.as_deref(), &cwd);
    if let Some(warning) = destination.warning() {
        warn!(error = %warning, "Falling back to default log file");
        formatter.warn(&warning.to_string());
    }
    info!(log = %destination.path().display(), "Action log destination resolved");

    // Action lines would corrupt the JSON document on stdout.
    let action_log = ActionLog::new(destination.into_path(), settings.options.detail)
        .with_console(format == OutputFormat::Human);

    let reconciler = Arc::new(Reconciler::new(
        Arc::new(LocalFileSystemAdapter::new()),
        Arc::new(action_log) as Arc<dyn IActionSink>,
        settings.options,
    ));

    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let mut scheduler = SyncScheduler::new(
        reconciler,
        settings.source,
        settings.target,
        settings.interval,
        shutdown_token,
    );
    if once {
        scheduler = scheduler.with_max_passes(1);
    }

    let summary = scheduler.run().await;

    if once {
        match &summary.last_report {
            Some(report) => print_report(formatter.as_ref(), format, report),
            None => {
                formatter.error("Synchronization pass failed");
                bail!("Synchronization pass failed; see log output for details");
            }
        }
    }

    info!(
        passes = summary.passes,
        failed = summary.failed_passes,
        actions = summary.actions,
        "dirmirror shut down gracefully"
    );
    Ok(())
}

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
