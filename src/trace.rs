//! trace
//!
//! libgit2 diagnostic tracing, forwarded into `tracing`.
//!
//! libgit2 writes its own trace messages through a single process-wide
//! callback. [`set_level`] installs that callback and re-emits each message
//! as a `tracing` event with target `libgit2`, so it is filtered and
//! formatted with the rest of the log output.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

/// Errors from trace configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("unknown trace level {0}")]
    UnknownLevel(String),

    #[error("failed to install libgit2 trace callback: {0}")]
    Install(String),
}

/// libgit2 trace verbosity, from quietest to loudest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    None,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl TraceLevel {
    pub const ALL: [TraceLevel; 7] = [
        TraceLevel::None,
        TraceLevel::Fatal,
        TraceLevel::Error,
        TraceLevel::Warn,
        TraceLevel::Info,
        TraceLevel::Debug,
        TraceLevel::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TraceLevel::None => "none",
            TraceLevel::Fatal => "fatal",
            TraceLevel::Error => "error",
            TraceLevel::Warn => "warn",
            TraceLevel::Info => "info",
            TraceLevel::Debug => "debug",
            TraceLevel::Trace => "trace",
        }
    }

    fn to_git2(self) -> git2::TraceLevel {
        match self {
            TraceLevel::None => git2::TraceLevel::None,
            TraceLevel::Fatal => git2::TraceLevel::Fatal,
            TraceLevel::Error => git2::TraceLevel::Error,
            TraceLevel::Warn => git2::TraceLevel::Warn,
            TraceLevel::Info => git2::TraceLevel::Info,
            TraceLevel::Debug => git2::TraceLevel::Debug,
            TraceLevel::Trace => git2::TraceLevel::Trace,
        }
    }
}

impl FromStr for TraceLevel {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TraceLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| TraceError::UnknownLevel(s.to_string()))
    }
}

impl std::fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set libgit2's trace level and route its messages into `tracing`.
///
/// # Example
///
/// ```
/// use gitbridge::trace::{set_level, TraceLevel};
///
/// set_level(TraceLevel::None).unwrap();
/// assert!("loud".parse::<TraceLevel>().is_err());
/// ```
pub fn set_level(level: TraceLevel) -> Result<(), TraceError> {
    git2::trace_set(level.to_git2(), forward).map_err(|e| TraceError::Install(e.message().to_string()))?;
    debug!(%level, "libgit2 trace level set");
    Ok(())
}

/// Parse a level name and apply it.
pub fn set_level_named(name: &str) -> Result<TraceLevel, TraceError> {
    let level = name.parse()?;
    set_level(level)?;
    Ok(level)
}

fn forward(level: git2::TraceLevel, message: &[u8]) {
    let message = String::from_utf8_lossy(message);
    match level {
        git2::TraceLevel::Fatal | git2::TraceLevel::Error => {
            error!(target: "libgit2", "{message}")
        }
        git2::TraceLevel::Warn => warn!(target: "libgit2", "{message}"),
        git2::TraceLevel::Info => info!(target: "libgit2", "{message}"),
        git2::TraceLevel::Debug => debug!(target: "libgit2", "{message}"),
        _ => trace!(target: "libgit2", "{message}"),
    }
}
