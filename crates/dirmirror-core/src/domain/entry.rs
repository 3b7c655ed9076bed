//! Directory entries and snapshots
//!
//! A [`DirectorySnapshot`] is the listing of one directory's immediate
//! children, taken once per directory per pass. It is never refreshed while
//! the pass is running; the reconciler works from the snapshot and the
//! mutations it performs itself.
//!
//! Names are kept as [`OsString`]: any name the platform can list can be
//! mirrored, UTF-8 or not.

use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Kind of filesystem object found in a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Regular file (after following symlinks, when enabled)
    File,
    /// Directory (after following symlinks, when enabled)
    Directory,
    /// Anything else: unfollowed or dangling symlinks, sockets, fifos, devices
    Other,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A single named child of a directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    name: OsString,
    kind: EntryKind,
}

impl Entry {
    /// Creates an entry, rejecting names that are not a single path component
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Result<Self, DomainError> {
        let name = name.into();
        let bytes = name.as_encoded_bytes();
        if bytes.is_empty() || bytes == b"." || bytes == b".." || bytes.contains(&b'/') {
            return Err(DomainError::InvalidEntryName(
                name.to_string_lossy().into_owned(),
            ));
        }
        Ok(Self { name, kind })
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }
}

/// Names present in one directory, partitioned by kind
///
/// Only files and directories are mirrored. Names of any other kind are
/// kept in [`others`](Self::others): ignored when listing Source, removed
/// when found in Target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    files: BTreeSet<OsString>,
    directories: BTreeSet<OsString>,
    others: BTreeSet<OsString>,
}

impl DirectorySnapshot {
    /// Creates an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry to the snapshot
    pub fn insert(&mut self, entry: Entry) {
        match entry.kind {
            EntryKind::File => self.files.insert(entry.name),
            EntryKind::Directory => self.directories.insert(entry.name),
            EntryKind::Other => self.others.insert(entry.name),
        };
    }

    /// Builder-style variant of [`insert`](Self::insert) for tests and adapters
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.insert(entry);
        self
    }

    pub fn files(&self) -> &BTreeSet<OsString> {
        &self.files
    }

    pub fn directories(&self) -> &BTreeSet<OsString> {
        &self.directories
    }

    pub fn others(&self) -> &BTreeSet<OsString> {
        &self.others
    }

    pub fn contains_file(&self, name: impl AsRef<OsStr>) -> bool {
        self.files.contains(name.as_ref())
    }

    pub fn contains_directory(&self, name: impl AsRef<OsStr>) -> bool {
        self.directories.contains(name.as_ref())
    }

    pub fn contains_other(&self, name: impl AsRef<OsStr>) -> bool {
        self.others.contains(name.as_ref())
    }

    /// Number of files and directories
    pub fn len(&self) -> usize {
        self.files.len() + self.directories.len()
    }

    /// True when there are no files or directories; `others` are not counted
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }

    /// True when nothing at all was listed
    pub fn is_bare(&self) -> bool {
        self.is_empty() && self.others.is_empty()
    }
}

impl FromIterator<Entry> for DirectorySnapshot {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for entry in iter {
            snapshot.insert(entry);
        }
        snapshot
    }
}
