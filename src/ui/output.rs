//! ui::output
//!
//! Output formatting, display, and log setup.
//!
//! # Design
//!
//! Results go to stdout and respect the quiet flag. Diagnostics go through
//! `tracing` to stderr; `--debug` raises the default filter, and
//! `GITBRIDGE_LOG` (or `RUST_LOG`) overrides it.

use std::fmt::Display;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a log filter directive.
pub const LOG_ENV: &str = "GITBRIDGE_LOG";

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Log filter used when no environment override is set.
    ///
    /// libgit2 trace events always pass; `--trace` alone decides how many
    /// libgit2 emits.
    pub fn default_filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error,libgit2=trace",
            Verbosity::Normal => "warn,libgit2=trace",
            Verbosity::Debug => "warn,gitbridge=debug,libgit2=trace",
        }
    }
}

/// Pick the filter directive: `GITBRIDGE_LOG`, then `RUST_LOG`, then the
/// verbosity default.
fn filter_directive(verbosity: Verbosity, env: impl Fn(&str) -> Option<String>) -> String {
    env(LOG_ENV)
        .or_else(|| env("RUST_LOG"))
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| verbosity.default_filter().to_string())
}

/// Install the global `tracing` subscriber writing to stderr.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(verbosity: Verbosity) {
    let directive = filter_directive(verbosity, |key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity == Verbosity::Debug),
        )
        .try_init();
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a result value, as JSON when requested.
///
/// Values are always printed, even in quiet mode; they are the command's
/// answer, not commentary.
pub fn value<T: serde::Serialize + Display>(value: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_debug() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn env_filter_overrides_default() {
        let env = |key: &str| (key == LOG_ENV).then(|| "gitbridge=trace".to_string());
        assert_eq!(filter_directive(Verbosity::Normal, env), "gitbridge=trace");
    }

    #[test]
    fn rust_log_is_fallback() {
        let env = |key: &str| (key == "RUST_LOG").then(|| "info".to_string());
        assert_eq!(filter_directive(Verbosity::Quiet, env), "info");
    }

    #[test]
    fn default_follows_verbosity() {
        assert_eq!(
            filter_directive(Verbosity::Normal, |_| None),
            "warn,libgit2=trace"
        );
        assert_eq!(
            filter_directive(Verbosity::Debug, |_| Some(String::new())),
            Verbosity::Debug.default_filter()
        );
    }

    #[test]
    fn libgit2_trace_passes_at_every_verbosity() {
        for verbosity in [Verbosity::Quiet, Verbosity::Normal, Verbosity::Debug] {
            let directive = verbosity.default_filter();
            assert!(directive.contains("libgit2=trace"), "{directive}");
            assert!(EnvFilter::try_new(directive).is_ok(), "{directive}");
        }
    }

    #[test]
    fn list_formatting() {
        assert_eq!(format_list(&["a", "b"], "  "), "  a\n  b");
    }
}
