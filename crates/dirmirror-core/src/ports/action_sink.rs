//! Action sink port (driven/secondary port)
//!
//! The reconciler reports every mutation it applies to an [`IActionSink`].
//! The production implementation appends lines to a log file and echoes
//! them to the console; tests use an in-memory recorder.
//!
//! ## Design Notes
//!
//! - Methods return `()`: a sink that cannot persist a line must log the
//!   failure itself and carry on. Reporting never aborts a pass.
//! - `on_source_missing` is a console notice, not an action, and must not be
//!   written to the persistent log.

use std::path::Path;

use chrono::{DateTime, Local};

use crate::domain::action::Action;

/// Port trait for the logging collaborator
#[async_trait::async_trait]
pub trait IActionSink: Send + Sync {
    /// Called once at the start of every scheduled pass
    async fn on_pass_start(&self, started_at: DateTime<Local>);

    /// Called immediately after `action` has been applied below `target_root`
    async fn on_action(&self, target_root: &Path, action: &Action);

    /// Called when a Source directory does not exist at visit time
    async fn on_source_missing(&self, source: &Path);
}
