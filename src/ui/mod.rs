//! ui
//!
//! User-facing output and log setup.
//!
//! # Modules
//!
//! - [`output`] - Output formatting, verbosity, `tracing` subscriber
//! - [`prompts`] - Password prompt

pub mod output;
pub mod prompts;
