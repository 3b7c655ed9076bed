//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`IMirrorFileSystem`] on top of `tokio::fs`, moving the
//! multi-step blocking sequences onto the blocking pool.
//!
//! ## Design Decisions
//!
//! - **Atomic copies**: content is written to a uniquely named sibling temp
//!   file which is renamed over the destination, so readers see old or new
//!   bytes, never a prefix. A crash can leave the temp file behind; it is not
//!   in Source, so the next pass removes it like any other orphan.
//! - **Metadata**: permissions and modification time are carried over.
//! - **Comparison**: different sizes mean different content; equal sizes are
//!   compared in 64 KiB chunks until the first mismatch.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use dirmirror_core::{
    domain::entry::{DirectorySnapshot, Entry, EntryKind},
    ports::mirror_filesystem::IMirrorFileSystem,
};
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument, warn};

use crate::SyncError;

/// Prefix of the temporary files used while replacing a destination
pub const TEMP_PREFIX: &str = ".dirmirror-";

/// Chunk size for streamed comparisons
const COMPARE_CHUNK: usize = 64 * 1024;

// ============================================================================
// LocalFileSystemAdapter struct
// ============================================================================

/// Adapter that bridges the [`IMirrorFileSystem`] port to the real filesystem.
///
/// Zero-sized: every operation takes its context from the paths passed in.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Reads until `buf` is full or the file ends; returns the bytes read.
async fn read_full(file: &mut tokio::fs::File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Blocking copy: temp file, content, mtime, permissions, rename.
///
/// The temp file is deleted on drop unless it was persisted.
fn copy_atomic_blocking(src: &Path, dst: &Path) -> Result<(), SyncError> {
    let parent = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut reader = std::fs::File::open(src).map_err(|e| SyncError::from_io(src, e))?;
    let meta = reader.metadata().map_err(|e| SyncError::from_io(src, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| SyncError::from_io(parent, e))?;
    std::io::copy(&mut reader, tmp.as_file_mut())
        .map_err(|e| SyncError::from_io(tmp.path(), e))?;

    if let Ok(modified) = meta.modified() {
        tmp.as_file()
            .set_modified(modified)
            .map_err(|e| SyncError::from_io(tmp.path(), e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| SyncError::from_io(tmp.path(), e))?;
    tmp.as_file()
        .set_permissions(meta.permissions())
        .map_err(|e| SyncError::from_io(tmp.path(), e))?;

    tmp.persist(dst)
        .map_err(|e| SyncError::from_io(dst, e.error))?;
    Ok(())
}

// ============================================================================
// IMirrorFileSystem implementation
// ============================================================================

#[async_trait::async_trait]
impl IMirrorFileSystem for LocalFileSystemAdapter {
    #[instrument(skip(self), fields(dir = %dir.display()))]
    async fn snapshot(
        &self,
        dir: &Path,
        follow_symlinks: bool,
    ) -> anyhow::Result<Option<DirectorySnapshot>> {
        match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(SyncError::NotADirectory(dir.to_path_buf()).into()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("directory not found");
                return Ok(None);
            }
            Err(e) => return Err(SyncError::from_io(dir, e).into()),
        }

        let mut snapshot = DirectorySnapshot::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| SyncError::from_io(dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SyncError::from_io(dir, e))?
        {
            let path = entry.path();
            let name = entry.file_name();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| SyncError::from_io(&path, e))?;

            let kind = if file_type.is_symlink() {
                if follow_symlinks {
                    match tokio::fs::metadata(&path).await {
                        Ok(meta) if meta.is_dir() => EntryKind::Directory,
                        Ok(meta) if meta.is_file() => EntryKind::File,
                        Ok(_) => EntryKind::Other,
                        Err(e) if e.kind() == ErrorKind::NotFound => {
                            debug!(name = %path.display(), "dangling symlink");
                            EntryKind::Other
                        }
                        Err(e) => return Err(SyncError::from_io(&path, e).into()),
                    }
                } else {
                    EntryKind::Other
                }
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };

            snapshot.insert(Entry::new(name, kind)?);
        }

        debug!(entries = snapshot.len(), "snapshot taken");
        Ok(Some(snapshot))
    }

    async fn exists(&self, path: &Path) -> anyhow::Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SyncError::from_io(path, e).into()),
        }
    }

    async fn is_directory(&self, path: &Path) -> anyhow::Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SyncError::from_io(path, e).into()),
        }
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn create_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        debug!("creating directory");
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| SyncError::from_io(path, e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(a = %a.display(), b = %b.display()))]
    async fn files_equal(&self, a: &Path, b: &Path) -> anyhow::Result<bool> {
        let mut fa = tokio::fs::File::open(a)
            .await
            .map_err(|e| SyncError::from_io(a, e))?;
        let mut fb = tokio::fs::File::open(b)
            .await
            .map_err(|e| SyncError::from_io(b, e))?;

        let len_a = fa.metadata().await.map_err(|e| SyncError::from_io(a, e))?.len();
        let len_b = fb.metadata().await.map_err(|e| SyncError::from_io(b, e))?.len();
        if len_a != len_b {
            debug!(len_a, len_b, "sizes differ");
            return Ok(false);
        }

        let mut buf_a = vec![0u8; COMPARE_CHUNK];
        let mut buf_b = vec![0u8; COMPARE_CHUNK];
        loop {
            let na = read_full(&mut fa, &mut buf_a)
                .await
                .map_err(|e| SyncError::from_io(a, e))?;
            let nb = read_full(&mut fb, &mut buf_b)
                .await
                .map_err(|e| SyncError::from_io(b, e))?;

            if na != nb || buf_a[..na] != buf_b[..nb] {
                debug!("content differs");
                return Ok(false);
            }
            if na == 0 {
                return Ok(true);
            }
        }
    }

    #[instrument(skip(self), fields(src = %src.display(), dst = %dst.display()))]
    async fn copy_file(&self, src: &Path, dst: &Path) -> anyhow::Result<()> {
        let src_owned = src.to_path_buf();
        let dst_owned = dst.to_path_buf();

        tokio::task::spawn_blocking(move || copy_atomic_blocking(&src_owned, &dst_owned))
            .await
            .context("copy task panicked")??;

        debug!("copy complete");
        Ok(())
    }

    #[instrument(skip(self, outer), fields(src = %src.display(), dst = %dst.display()))]
    async fn copy_tree(
        &self,
        src: &Path,
        dst: &Path,
        follow_symlinks: bool,
        outer: &[PathBuf],
    ) -> anyhow::Result<()> {
        // Each pending directory carries the canonical paths above it, so
        // only a link back into its own ancestry counts as a cycle.
        let mut stack = vec![(src.to_path_buf(), dst.to_path_buf(), outer.to_vec())];

        while let Some((from, to, mut ancestors)) = stack.pop() {
            let canonical = self.canonicalize(&from).await?;
            if ancestors.contains(&canonical) {
                warn!(path = %from.display(), "Symlink cycle detected; not descending");
                continue;
            }

            let snapshot = self
                .snapshot(&from, follow_symlinks)
                .await?
                .ok_or_else(|| SyncError::PathNotFound(from.clone()))?;

            self.create_dir_all(&to).await?;

            for name in snapshot.files() {
                self.copy_file(&from.join(name), &to.join(name)).await?;
            }

            ancestors.push(canonical);
            for name in snapshot.directories() {
                stack.push((from.join(name), to.join(name), ancestors.clone()));
            }
        }

        debug!("tree copy complete");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn remove_file(&self, path: &Path) -> anyhow::Result<()> {
        debug!("removing file");
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| SyncError::from_io(path, e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn remove_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        debug!("removing directory recursively");
        tokio::fs::remove_dir_all(path)
            .await
            .map_err(|e| SyncError::from_io(path, e))?;
        Ok(())
    }

    async fn canonicalize(&self, path: &Path) -> anyhow::Result<PathBuf> {
        Ok(tokio::fs::canonicalize(path)
            .await
            .map_err(|e| SyncError::from_io(path, e))?)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
