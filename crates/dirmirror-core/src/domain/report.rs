//! Summary of one synchronization pass

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::action::{Action, ActionKind};

/// Result of a completed pass
///
/// An already-synchronized tree and a tree with nothing to do look the same:
/// both produce an empty action list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    /// Actions in the order they were applied
    pub actions: Vec<Action>,
    /// Source directories that did not exist when they were visited
    pub missing_sources: Vec<PathBuf>,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl PassReport {
    fn count(&self, kinds: &[ActionKind]) -> usize {
        self.actions
            .iter()
            .filter(|a| kinds.contains(&a.kind()))
            .count()
    }

    /// Files copied into Target that did not exist before
    pub fn created(&self) -> usize {
        self.count(&[ActionKind::Created])
    }

    /// Files overwritten with Source's bytes
    pub fn modified(&self) -> usize {
        self.count(&[ActionKind::Modified])
    }

    /// Files and directories deleted from Target
    pub fn removed(&self) -> usize {
        self.count(&[ActionKind::Removed, ActionKind::FolderRemoved])
    }

    /// Returns true when the pass changed nothing
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}
