//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the reconciler depends on, whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IMirrorFileSystem`] - Directory listings, byte comparison, copy and delete
//! - [`IActionSink`] - Receives pass-start stamps, applied actions and notices

pub mod action_sink;
pub mod mirror_filesystem;

pub use action_sink::IActionSink;
pub use mirror_filesystem::IMirrorFileSystem;
