//! ActionLog - append-only action log with console echo
//!
//! Implements `IActionSink`. Every line goes to the log file first and is
//! then printed to stdout. All methods are non-fatal: a failed write is
//! logged via `tracing::warn!` and the pass carries on.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use dirmirror_core::{
    domain::action::{Action, LogDetail},
    ports::action_sink::IActionSink,
};
use tokio::io::AsyncWriteExt;

/// Format of pass-start lines
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Action log writing to a single file
pub struct ActionLog {
    path: PathBuf,
    detail: LogDetail,
    console: bool,
}

impl ActionLog {
    /// Creates a log appending to `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>, detail: LogDetail) -> Self {
        Self {
            path: path.into(),
            detail,
            console: true,
        }
    }

    /// Enables or disables the stdout echo
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn detail(&self) -> LogDetail {
        self.detail
    }

    /// Renders an action as `<path> - <Verb>`
    pub fn format_action(&self, target_root: &Path, action: &Action) -> String {
        format!(
            "{} - {}",
            action.target_path(target_root).display(),
            action.kind().verb(self.detail)
        )
    }

    /// Renders a pass-start line as `YYYY-MM-DD HH:MM:SS`
    pub fn format_pass_start(started_at: DateTime<Local>) -> String {
        started_at.format(TIMESTAMP_FORMAT).to_string()
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{line}\n").as_bytes()).await?;
        file.flush().await
    }

    /// Persists and echoes a line, swallowing write errors with a warning.
    async fn emit(&self, line: &str) {
        if let Err(e) = self.write_line(line).await {
            tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to append to action log"
            );
        }
        if self.console {
            println!("{line}");
        }
    }
}

#[async_trait]
impl IActionSink for ActionLog {
    async fn on_pass_start(&self, started_at: DateTime<Local>) {
        self.emit(&Self::format_pass_start(started_at)).await;
    }

    async fn on_action(&self, target_root: &Path, action: &Action) {
        let line = self.format_action(target_root, action);
        self.emit(&line).await;
    }

    async fn on_source_missing(&self, source: &Path) {
        if self.console {
            println!("Source folder does not exist: {}", source.display());
        }
    }
}
