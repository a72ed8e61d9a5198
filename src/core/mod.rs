//! core
//!
//! Domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, BranchName, CommitName, ResetMode
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod types;
