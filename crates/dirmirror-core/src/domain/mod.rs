//! Domain entities
//!
//! This module contains the core domain types for dirmirror:
//! - Directory entries and per-level snapshots
//! - Actions applied to the mirror and the logging detail level
//! - Pass reports summarising one reconciliation
//! - Domain-specific error types

pub mod action;
pub mod entry;
pub mod errors;
pub mod report;

// Re-export commonly used types
pub use action::{Action, ActionKind, LogDetail};
pub use entry::{DirectorySnapshot, Entry, EntryKind};
pub use errors::DomainError;
pub use report::PassReport;
