//! Integration test: Reconciler → ActionLog → log file
//!
//! Runs real passes over temporary trees and checks the lines the log file
//! receives, end to end.

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use dirmirror_audit::{ActionLog, LogDestination};
use dirmirror_core::{domain::action::LogDetail, ports::action_sink::IActionSink};
use dirmirror_sync::{
    engine::{Reconciler, ReconcilerOptions},
    filesystem::LocalFileSystemAdapter,
};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let p = root.join(rel);
    std::fs::create_dir_all(p.parent().unwrap()).unwrap();
    std::fs::write(p, content).unwrap();
}

fn setup(detail: LogDetail, log_dir: &Path) -> (Reconciler, Arc<ActionLog>) {
    let dest = LogDestination::resolve(Some(log_dir), log_dir);
    let log = Arc::new(ActionLog::new(dest.into_path(), detail).with_console(false));
    let reconciler = Reconciler::new(
        Arc::new(LocalFileSystemAdapter::new()),
        Arc::clone(&log) as Arc<dyn IActionSink>,
        ReconcilerOptions {
            detail,
            follow_symlinks: true,
        },
    );
    (reconciler, log)
}

#[tokio::test]
async fn test_fine_pass_writes_one_line_per_action() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write(src.path(), "a.txt", b"a");
    write(src.path(), "changed.txt", b"new");
    write(dst.path(), "changed.txt", b"old");
    write(dst.path(), "stale.txt", b"s");

    let (reconciler, log) = setup(LogDetail::Fine, logs.path());
    log.on_pass_start(Local::now()).await;
    reconciler.synchronize(src.path(), dst.path()).await.unwrap();

    let content = std::fs::read_to_string(logs.path().join("log.txt")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    let root = dst.path().display();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0].len(), "YYYY-MM-DD HH:MM:SS".len());
    assert_eq!(lines[1], format!("{root}/stale.txt - Removed"));
    assert_eq!(lines[2], format!("{root}/a.txt - Created"));
    assert_eq!(lines[3], format!("{root}/changed.txt - Modified"));
}

#[tokio::test]
async fn test_coarse_initial_pass_logs_single_copy() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write(src.path(), "x/y/z.txt", b"z");
    let target = dst.path().join("mirror");

    let (reconciler, log) = setup(LogDetail::Coarse, logs.path());
    reconciler.synchronize(src.path(), &target).await.unwrap();

    let content = std::fs::read_to_string(log.path()).unwrap();
    assert_eq!(content, format!("{} - Copied\n", target.display()));
}

#[tokio::test]
async fn test_missing_source_leaves_log_untouched() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();

    let (reconciler, log) = setup(LogDetail::Fine, logs.path());
    let report = reconciler
        .synchronize(&src.path().join("absent"), dst.path())
        .await
        .unwrap();

    assert_eq!(report.missing_sources.len(), 1);
    assert!(!log.path().exists());
}
