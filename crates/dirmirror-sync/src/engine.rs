//! One-way reconciliation engine
//!
//! The [`Reconciler`] makes a Target tree identical to a Source tree, one
//! directory level at a time, then recurses into every Source subdirectory.
//!
//! ## Per-level Flow
//!
//! 1. **Snapshot** Source (missing: notify, skip the level) and Target
//!    (missing: create it, or bulk-copy under coarse detail). Target is
//!    listed without following links.
//! 2. **Files**: remove Target-only files and anything in Target that is
//!    neither a file nor a directory, copy Source-only files (`Created`),
//!    then overwrite files whose bytes differ (`Modified`).
//! 3. **Folders**: remove Target-only directories, then recurse into every
//!    Source directory, matched or not.
//!
//! ## Failure Policy
//!
//! A missing Source directory only skips its own level. Any other
//! filesystem error aborts the pass; actions already applied stay applied
//! and have been reported. The scheduler retries on its next tick.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use dirmirror_core::config::SyncConfig;
use dirmirror_core::domain::action::{Action, ActionKind, LogDetail};
use dirmirror_core::domain::entry::DirectorySnapshot;
use dirmirror_core::domain::report::PassReport;
use dirmirror_core::ports::action_sink::IActionSink;
use dirmirror_core::ports::mirror_filesystem::IMirrorFileSystem;
use tracing::{debug, info, warn};

use crate::SyncError;

// ============================================================================
// ReconcilerOptions
// ============================================================================

/// Tunables for a [`Reconciler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerOptions {
    /// Log granularity; `Coarse` also enables the bulk copy fast path
    pub detail: LogDetail,
    /// Follow symbolic links in Source (cycles are detected and skipped)
    pub follow_symlinks: bool,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            detail: LogDetail::Fine,
            follow_symlinks: true,
        }
    }
}

impl From<&SyncConfig> for ReconcilerOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            detail: config.detail,
            follow_symlinks: config.follow_symlinks,
        }
    }
}

/// State threaded through one pass
struct PassState {
    source_root: PathBuf,
    target_root: PathBuf,
    report: PassReport,
    /// Canonical Source directories on the current recursion path
    ancestors: Vec<PathBuf>,
}

impl PassState {
    fn source(&self, rel: &Path) -> PathBuf {
        resolve(&self.source_root, rel)
    }

    fn target(&self, rel: &Path) -> PathBuf {
        resolve(&self.target_root, rel)
    }
}

fn resolve(root: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

/// Whole milliseconds in `elapsed`, saturating at `u64::MAX`
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

type LevelFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

// ============================================================================
// Reconciler
// ============================================================================

/// Brings a Target tree into agreement with a Source tree
///
/// Stateless across passes: every level is re-listed on every call.
pub struct Reconciler {
    fs: Arc<dyn IMirrorFileSystem>,
    sink: Arc<dyn IActionSink>,
    options: ReconcilerOptions,
}

impl Reconciler {
    pub fn new(
        fs: Arc<dyn IMirrorFileSystem>,
        sink: Arc<dyn IActionSink>,
        options: ReconcilerOptions,
    ) -> Self {
        Self { fs, sink, options }
    }

    pub fn options(&self) -> ReconcilerOptions {
        self.options
    }

    /// The collaborator receiving every applied action
    pub fn sink(&self) -> &Arc<dyn IActionSink> {
        &self.sink
    }

    /// Runs one full pass of `target` against `source`
    ///
    /// A missing `source` is not an error: it is reported through the sink,
    /// listed in [`PassReport::missing_sources`] and nothing is mutated.
    ///
    /// # Errors
    /// Returns [`SyncError::TargetNotDirectory`] if `target` is a file, and
    /// the underlying filesystem error (with context) for anything that
    /// fails while listing, comparing, copying or deleting.
    #[tracing::instrument(skip(self), fields(source = %source.display(), target = %target.display()))]
    pub async fn synchronize(&self, source: &Path, target: &Path) -> Result<PassReport> {
        let start = Instant::now();

        if self.fs.exists(target).await? && !self.fs.is_directory(target).await? {
            return Err(SyncError::TargetNotDirectory(target.to_path_buf()).into());
        }

        let mut pass = PassState {
            source_root: source.to_path_buf(),
            target_root: target.to_path_buf(),
            report: PassReport::default(),
            ancestors: Vec::new(),
        };

        self.sync_level(&mut pass, PathBuf::new()).await?;

        pass.report.duration_ms = millis(start.elapsed());
        info!(
            actions = pass.report.actions.len(),
            created = pass.report.created(),
            modified = pass.report.modified(),
            removed = pass.report.removed(),
            duration_ms = pass.report.duration_ms,
            "Reconciliation finished"
        );
        Ok(pass.report)
    }

    /// Applies bookkeeping for one mutation that has just succeeded
    async fn record(&self, pass: &mut PassState, kind: ActionKind, rel: PathBuf) {
        let action = Action::new(kind, rel);
        debug!(kind = %action.kind(), path = %action.path().display(), "applied");
        self.sink.on_action(&pass.target_root, &action).await;
        pass.report.actions.push(action);
    }

    fn sync_level<'a>(&'a self, pass: &'a mut PassState, rel: PathBuf) -> LevelFuture<'a> {
        Box::pin(async move {
            let source_dir = pass.source(&rel);
            let target_dir = pass.target(&rel);
            let follow = self.options.follow_symlinks;

            let Some(source_snap) = self
                .fs
                .snapshot(&source_dir, follow)
                .await
                .with_context(|| format!("Failed to list source {}", source_dir.display()))?
            else {
                let err = SyncError::SourceMissing(source_dir.clone());
                warn!(error = %err, "Skipping level");
                self.sink.on_source_missing(&source_dir).await;
                pass.report.missing_sources.push(source_dir);
                return Ok(());
            };

            let canonical = if follow {
                let canonical = self.fs.canonicalize(&source_dir).await?;
                if pass.ancestors.contains(&canonical) {
                    warn!(
                        source = %source_dir.display(),
                        "Symlink cycle detected; not descending"
                    );
                    return Ok(());
                }
                Some(canonical)
            } else {
                None
            };

            // Links inside Target are never followed.
            let target_snap = self
                .fs
                .snapshot(&target_dir, false)
                .await
                .with_context(|| format!("Failed to list target {}", target_dir.display()))?;

            // Coarse fast path: nothing to diff against, copy the subtree whole.
            let target_empty = target_snap.as_ref().map_or(true, DirectorySnapshot::is_bare);
            if self.options.detail == LogDetail::Coarse && target_empty && !source_snap.is_empty() {
                self.fs
                    .copy_tree(&source_dir, &target_dir, follow, &pass.ancestors)
                    .await
                    .with_context(|| {
                        format!(
                            "Failed to copy {} into {}",
                            source_dir.display(),
                            target_dir.display()
                        )
                    })?;
                self.record(pass, ActionKind::BulkCopied, rel).await;
                return Ok(());
            }

            let target_snap = match target_snap {
                Some(snap) => snap,
                None => {
                    self.fs.create_dir_all(&target_dir).await?;
                    self.record(pass, ActionKind::FolderCreated, rel.clone()).await;
                    DirectorySnapshot::new()
                }
            };

            if let Some(canonical) = canonical {
                pass.ancestors.push(canonical);
            }

            self.reconcile_files(pass, &rel, &source_snap, &target_snap)
                .await?;
            self.reconcile_folders(pass, &rel, &source_snap, &target_snap)
                .await?;

            if follow {
                pass.ancestors.pop();
            }
            Ok(())
        })
    }

    async fn reconcile_files(
        &self,
        pass: &mut PassState,
        rel: &Path,
        source_snap: &DirectorySnapshot,
        target_snap: &DirectorySnapshot,
    ) -> Result<()> {
        let mut stale = Vec::new();

        for name in target_snap.others() {
            let rel_name = rel.join(name);
            let target_entry = pass.target(&rel_name);
            self.fs
                .remove_file(&target_entry)
                .await
                .with_context(|| format!("Failed to remove {}", target_entry.display()))?;
            self.record(pass, ActionKind::Removed, rel_name).await;
        }

        for name in target_snap.files() {
            let rel_name = rel.join(name);
            let target_file = pass.target(&rel_name);

            if source_snap.contains_file(name) {
                let source_file = pass.source(&rel_name);
                let equal = self
                    .fs
                    .files_equal(&source_file, &target_file)
                    .await
                    .with_context(|| format!("Failed to compare {}", rel_name.display()))?;
                if !equal {
                    stale.push(name.as_os_str());
                }
            } else {
                self.fs
                    .remove_file(&target_file)
                    .await
                    .with_context(|| format!("Failed to remove {}", target_file.display()))?;
                self.record(pass, ActionKind::Removed, rel_name).await;
            }
        }

        for name in source_snap.files() {
            if target_snap.contains_file(name) {
                continue;
            }
            let rel_name = rel.join(name);
            let target_file = pass.target(&rel_name);

            // A Target directory may occupy the name of a Source file.
            if target_snap.contains_directory(name) {
                self.fs
                    .remove_dir_all(&target_file)
                    .await
                    .with_context(|| format!("Failed to remove {}", target_file.display()))?;
                self.record(pass, ActionKind::FolderRemoved, rel_name.clone())
                    .await;
            }

            self.fs
                .copy_file(&pass.source(&rel_name), &target_file)
                .await
                .with_context(|| format!("Failed to copy {}", rel_name.display()))?;
            self.record(pass, ActionKind::Created, rel_name).await;
        }

        for name in stale {
            let rel_name = rel.join(name);
            self.fs
                .copy_file(&pass.source(&rel_name), &pass.target(&rel_name))
                .await
                .with_context(|| format!("Failed to overwrite {}", rel_name.display()))?;
            self.record(pass, ActionKind::Modified, rel_name).await;
        }

        Ok(())
    }

    async fn reconcile_folders(
        &self,
        pass: &mut PassState,
        rel: &Path,
        source_snap: &DirectorySnapshot,
        target_snap: &DirectorySnapshot,
    ) -> Result<()> {
        for name in target_snap.directories() {
            // Clashes with Source files were settled in the file phase.
            if source_snap.contains_directory(name) || source_snap.contains_file(name) {
                continue;
            }
            let rel_name = rel.join(name);
            let target_dir = pass.target(&rel_name);
            self.fs
                .remove_dir_all(&target_dir)
                .await
                .with_context(|| format!("Failed to remove {}", target_dir.display()))?;
            self.record(pass, ActionKind::FolderRemoved, rel_name).await;
        }

        for name in source_snap.directories() {
            self.sync_level(pass, rel.join(name)).await?;
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
