//! Mirror filesystem port (driven/secondary port)
//!
//! This module defines every filesystem operation the reconciler needs:
//! listing a directory into a [`DirectorySnapshot`], byte-exact comparison,
//! atomic copies and recursive deletes.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific;
//!   adapters attach the failing path and operation as context.
//! - A missing directory is not an error for [`IMirrorFileSystem::snapshot`]:
//!   it returns `Ok(None)` so the caller can tell "absent" from "unreadable".

use std::path::{Path, PathBuf};

use crate::domain::entry::DirectorySnapshot;

/// Port trait for the filesystem operations used by the reconciler
#[async_trait::async_trait]
pub trait IMirrorFileSystem: Send + Sync {
    /// Lists the immediate children of `dir`
    ///
    /// Returns `Ok(None)` if `dir` does not exist. With `follow_symlinks`
    /// a link is classified by what it points to; without it every link is
    /// listed under [`DirectorySnapshot::others`]. Dangling links and special
    /// files always land there.
    async fn snapshot(
        &self,
        dir: &Path,
        follow_symlinks: bool,
    ) -> anyhow::Result<Option<DirectorySnapshot>>;

    /// Returns true if `path` exists (following symlinks)
    async fn exists(&self, path: &Path) -> anyhow::Result<bool>;

    /// Returns true if `path` exists and is a directory (following symlinks)
    async fn is_directory(&self, path: &Path) -> anyhow::Result<bool>;

    /// Creates a directory and all missing parents; a no-op if it exists
    async fn create_dir_all(&self, path: &Path) -> anyhow::Result<()>;

    /// Compares the full contents of two files byte by byte
    async fn files_equal(&self, a: &Path, b: &Path) -> anyhow::Result<bool>;

    /// Copies `src` over `dst`, carrying permissions and modification time
    ///
    /// Either the previous content of `dst` or the complete new content is
    /// visible at any time.
    async fn copy_file(&self, src: &Path, dst: &Path) -> anyhow::Result<()>;

    /// Copies the whole tree below `src` into `dst`, creating `dst` if needed
    ///
    /// `outer` lists the canonical directories above `src` on the current
    /// walk; a link leading back into them, or into the copied tree's own
    /// ancestry, is not descended.
    async fn copy_tree(
        &self,
        src: &Path,
        dst: &Path,
        follow_symlinks: bool,
        outer: &[PathBuf],
    ) -> anyhow::Result<()>;

    /// Deletes a single file
    async fn remove_file(&self, path: &Path) -> anyhow::Result<()>;

    /// Deletes a directory and everything below it
    async fn remove_dir_all(&self, path: &Path) -> anyhow::Result<()>;

    /// Resolves symlinks and relative components of an existing path
    async fn canonicalize(&self, path: &Path) -> anyhow::Result<PathBuf>;
}
