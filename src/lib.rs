//! gitbridge - git repository operations for embedding hosts
//!
//! A small set of repository operations (init/open, remote, branch, reset,
//! merge, commit, lookup, stage) plus fetch and push that run off the
//! caller's thread and report completion through a pollable handle.
//!
//! # Architecture
//!
//! - [`bridge`] - Runs work inline or on a worker thread; completion handles
//! - [`transport`] - Fetch/push workers, credentials, certificate trust
//! - [`git`] - Repository handle, merge classification, remotes
//! - [`core`] - Strong types and configuration
//! - [`trace`] - libgit2 trace forwarding into `tracing`
//! - [`cli`] - Command-line host
//! - [`ui`] - Output and prompts
//!
//! # Guarantees
//!
//! 1. A background operation's error is reported exactly once, at the poll
//!    that observes completion
//! 2. Workers never share the caller's repository handle
//! 3. A merge never moves a branch; fast-forwards are reported to the caller
//! 4. Commit ids are always lowercase hex

pub mod bridge;
pub mod cli;
pub mod core;
pub mod git;
pub mod trace;
pub mod transport;
pub mod ui;
