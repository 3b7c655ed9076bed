//! dirmirror Core - Domain types and interfaces for one-way mirroring
//!
//! This crate contains the pieces shared by every other dirmirror crate:
//! - **Domain types** - `Entry`, `DirectorySnapshot`, `Action`, `PassReport`
//! - **Port definitions** - Traits for adapters: `IMirrorFileSystem`, `IActionSink`
//! - **Configuration** - Typed YAML configuration with validation and a builder
//!
//! # Architecture
//!
//! The domain module is pure data with no I/O. Ports define the trait
//! interfaces that the reconciler depends on; the filesystem adapter and the
//! action log live in `dirmirror-sync` and `dirmirror-audit` respectively.

pub mod config;
pub mod domain;
pub mod ports;
