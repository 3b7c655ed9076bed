//! Shared fixtures for reconciler and scheduler tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use dirmirror_core::domain::action::{Action, ActionKind, LogDetail};
use dirmirror_core::domain::entry::DirectorySnapshot;
use dirmirror_core::ports::action_sink::IActionSink;
use dirmirror_core::ports::mirror_filesystem::IMirrorFileSystem;
use dirmirror_sync::engine::{Reconciler, ReconcilerOptions};
use dirmirror_sync::filesystem::LocalFileSystemAdapter;
use dirmirror_sync::SyncError;

/// Everything a sink was told, in order
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    PassStart,
    Action(Action),
    SourceMissing(PathBuf),
}

/// In-memory [`IActionSink`] for asserting order and content
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Action(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl IActionSink for RecordingSink {
    async fn on_pass_start(&self, _started_at: DateTime<Local>) {
        self.events.lock().unwrap().push(SinkEvent::PassStart);
    }

    async fn on_action(&self, _target_root: &Path, action: &Action) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Action(action.clone()));
    }

    async fn on_source_missing(&self, source: &Path) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::SourceMissing(source.to_path_buf()));
    }
}

/// Local filesystem with injectable faults
///
/// `fail_copy_to` makes every copy onto that path fail with
/// [`SyncError::DiskFull`]. `vanish` deletes a directory right after its
/// parent has been listed, once.
#[derive(Default)]
pub struct FaultyFileSystem {
    inner: LocalFileSystemAdapter,
    fail_copy_to: Option<PathBuf>,
    vanish: Option<(PathBuf, PathBuf)>,
    vanished: AtomicBool,
}

impl FaultyFileSystem {
    pub fn failing_copy_to(path: impl Into<PathBuf>) -> Self {
        Self {
            fail_copy_to: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn vanishing_after_listing(parent: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            vanish: Some((parent.into(), dir.into())),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl IMirrorFileSystem for FaultyFileSystem {
    async fn snapshot(
        &self,
        dir: &Path,
        follow_symlinks: bool,
    ) -> anyhow::Result<Option<DirectorySnapshot>> {
        let snapshot = self.inner.snapshot(dir, follow_symlinks).await?;
        if let Some((parent, gone)) = &self.vanish {
            if dir == parent && !self.vanished.swap(true, Ordering::SeqCst) {
                std::fs::remove_dir_all(gone)?;
            }
        }
        Ok(snapshot)
    }

    async fn exists(&self, path: &Path) -> anyhow::Result<bool> {
        self.inner.exists(path).await
    }

    async fn is_directory(&self, path: &Path) -> anyhow::Result<bool> {
        self.inner.is_directory(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        self.inner.create_dir_all(path).await
    }

    async fn files_equal(&self, a: &Path, b: &Path) -> anyhow::Result<bool> {
        self.inner.files_equal(a, b).await
    }

    async fn copy_file(&self, src: &Path, dst: &Path) -> anyhow::Result<()> {
        if self.fail_copy_to.as_deref() == Some(dst) {
            return Err(SyncError::DiskFull(dst.to_path_buf()).into());
        }
        self.inner.copy_file(src, dst).await
    }

    async fn copy_tree(
        &self,
        src: &Path,
        dst: &Path,
        follow_symlinks: bool,
        outer: &[PathBuf],
    ) -> anyhow::Result<()> {
        self.inner.copy_tree(src, dst, follow_symlinks, outer).await
    }

    async fn remove_file(&self, path: &Path) -> anyhow::Result<()> {
        self.inner.remove_file(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        self.inner.remove_dir_all(path).await
    }

    async fn canonicalize(&self, path: &Path) -> anyhow::Result<PathBuf> {
        self.inner.canonicalize(path).await
    }
}

pub fn reconciler(detail: LogDetail) -> (Reconciler, Arc<RecordingSink>) {
    reconciler_with(
        Arc::new(LocalFileSystemAdapter::new()),
        ReconcilerOptions {
            detail,
            follow_symlinks: true,
        },
    )
}

pub fn reconciler_with(
    fs: Arc<dyn IMirrorFileSystem>,
    options: ReconcilerOptions,
) -> (Reconciler, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let reconciler = Reconciler::new(fs, Arc::clone(&sink) as Arc<dyn IActionSink>, options);
    (reconciler, sink)
}

/// Names directly inside `dir`, links included, without following anything
pub fn names(dir: &Path) -> Vec<std::ffi::OsString> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    names.sort();
    names
}

pub fn write(root: &Path, rel: &str, content: &[u8]) {
    let p = root.join(rel);
    if let Some(parent) = p.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(p, content).unwrap();
}

pub fn mkdir(root: &Path, rel: &str) {
    std::fs::create_dir_all(root.join(rel)).unwrap();
}

/// Recursive listing: relative path -> `Some(bytes)` for files, `None` for dirs
pub fn tree(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            let rel = path.strip_prefix(root).unwrap().to_path_buf();
            if path.is_dir() {
                out.insert(rel, None);
                walk(root, &path, out);
            } else {
                out.insert(rel, Some(std::fs::read(&path).unwrap()));
            }
        }
    }

    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

pub fn kinds(actions: &[Action]) -> Vec<ActionKind> {
    actions.iter().map(Action::kind).collect()
}

pub fn has(actions: &[Action], kind: ActionKind, path: &str) -> bool {
    actions
        .iter()
        .any(|a| a.kind() == kind && a.path() == Path::new(path))
}

pub fn position(actions: &[Action], kind: ActionKind, path: &str) -> usize {
    actions
        .iter()
        .position(|a| a.kind() == kind && a.path() == Path::new(path))
        .unwrap_or_else(|| panic!("no {kind} action for {path} in {actions:?}"))
}
