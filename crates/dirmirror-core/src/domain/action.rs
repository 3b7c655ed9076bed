//! Actions applied to the mirror
//!
//! Every mutation the reconciler performs on the Target tree is described
//! by exactly one [`Action`]. Actions are produced in the order they are
//! applied; that order is part of the observable contract (files before
//! folders, removals before recursion).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Kinds of mutations applied to the Target tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// A file that did not exist in Target was copied from Source
    Created,
    /// A file whose bytes differed from Source was overwritten
    Modified,
    /// A file absent from Source was deleted from Target
    Removed,
    /// A directory absent from Source was deleted (with its subtree)
    FolderRemoved,
    /// A directory was created in Target
    FolderCreated,
    /// A whole Source subtree was copied into an empty Target in one step
    BulkCopied,
}

impl ActionKind {
    /// Verb written to the action log for this kind
    ///
    /// Under [`LogDetail::Coarse`] new and overwritten files share one label.
    pub fn verb(&self, detail: LogDetail) -> &'static str {
        match (self, detail) {
            (ActionKind::Created | ActionKind::Modified, LogDetail::Coarse) => "Created/Modified",
            (ActionKind::Created, LogDetail::Fine) => "Created",
            (ActionKind::Modified, LogDetail::Fine) => "Modified",
            (ActionKind::Removed | ActionKind::FolderRemoved, _) => "Removed",
            (ActionKind::FolderCreated, _) => "Folder Created",
            (ActionKind::BulkCopied, _) => "Copied",
        }
    }

    /// Returns true for kinds that delete something from Target
    pub fn is_removal(&self) -> bool {
        matches!(self, ActionKind::Removed | ActionKind::FolderRemoved)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActionKind::Created => "created",
            ActionKind::Modified => "modified",
            ActionKind::Removed => "removed",
            ActionKind::FolderRemoved => "folder_removed",
            ActionKind::FolderCreated => "folder_created",
            ActionKind::BulkCopied => "bulk_copied",
        };
        write!(f, "{}", s)
    }
}

/// One applied mutation of the Target tree
///
/// `path` is relative to the Target root; the root itself is the empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    kind: ActionKind,
    path: PathBuf,
}

impl Action {
    pub fn new(kind: ActionKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Path relative to the Target root
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute (or caller-relative) location of the mutated object
    pub fn target_path(&self, target_root: &Path) -> PathBuf {
        if self.path.as_os_str().is_empty() {
            target_root.to_path_buf()
        } else {
            target_root.join(&self.path)
        }
    }
}

/// Granularity of the action log
///
/// Both levels perform identical mutations. `Coarse` copies an empty Target
/// level in one bulk operation and folds Created/Modified into one label;
/// `Fine` reports every entry individually.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogDetail {
    Coarse,
    #[default]
    Fine,
}

impl std::fmt::Display for LogDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogDetail::Coarse => "coarse",
            LogDetail::Fine => "fine",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LogDetail {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coarse" => Ok(LogDetail::Coarse),
            "fine" => Ok(LogDetail::Fine),
            other => Err(DomainError::InvalidDetail(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbs_fine() {
        let d = LogDetail::Fine;
        assert_eq!(ActionKind::Created.verb(d), "Created");
        assert_eq!(ActionKind::Modified.verb(d), "Modified");
        assert_eq!(ActionKind::Removed.verb(d), "Removed");
        assert_eq!(ActionKind::FolderRemoved.verb(d), "Removed");
        assert_eq!(ActionKind::FolderCreated.verb(d), "Folder Created");
        assert_eq!(ActionKind::BulkCopied.verb(d), "Copied");
    }

    #[test]
    fn test_verbs_coarse_fold_created_and_modified() {
        let d = LogDetail::Coarse;
        assert_eq!(ActionKind::Created.verb(d), "Created/Modified");
        assert_eq!(ActionKind::Modified.verb(d), "Created/Modified");
        assert_eq!(ActionKind::Removed.verb(d), "Removed");
        assert_eq!(ActionKind::BulkCopied.verb(d), "Copied");
    }

    #[test]
    fn test_target_path_for_root_and_child() {
        let root = Path::new("/mirror");
        let at_root = Action::new(ActionKind::BulkCopied, PathBuf::new());
        assert_eq!(at_root.target_path(root), PathBuf::from("/mirror"));

        let child = Action::new(ActionKind::Created, "sub/b.txt");
        assert_eq!(child.target_path(root), PathBuf::from("/mirror/sub/b.txt"));
    }

    #[test]
    fn test_log_detail_parse() {
        assert_eq!("coarse".parse::<LogDetail>().unwrap(), LogDetail::Coarse);
        assert_eq!(" Fine ".parse::<LogDetail>().unwrap(), LogDetail::Fine);
        assert!("verbose".parse::<LogDetail>().is_err());
        assert_eq!(LogDetail::default(), LogDetail::Fine);
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let action = Action::new(ActionKind::FolderRemoved, "old");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"], "folder_removed");
        assert_eq!(json["path"], "old");
    }

    #[test]
    fn test_is_removal() {
        assert!(ActionKind::Removed.is_removal());
        assert!(ActionKind::FolderRemoved.is_removal());
        assert!(!ActionKind::Created.is_removal());
    }
}
