//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug` / `--quiet`: Log verbosity
//! - `--json`: Machine-readable results
//! - `--inline`: Run fetch/push on the calling thread
//! - `--trace <level>`: libgit2 trace level
//! - `--certs <mode>` / `--cert-path <path>`: Certificate trust
//! - `--username <name>`: Transport username

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::types::ResetMode;

/// gitbridge - git repository operations with background fetch and push
#[derive(Parser, Debug)]
#[command(name = "gitbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if gitbridge was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run fetch and push on the calling thread
    #[arg(long, global = true)]
    pub inline: bool,

    /// libgit2 trace level (none, fatal, error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub trace: Option<String>,

    /// Certificate trust mode (noverify, dir, file, system)
    #[arg(long, global = true, value_name = "MODE")]
    pub certs: Option<String>,

    /// CA directory or bundle for --certs dir/file
    #[arg(long, global = true, value_name = "PATH")]
    pub cert_path: Option<PathBuf>,

    /// Username for fetch/push; password comes from GITBRIDGE_PASSWORD or a prompt
    #[arg(long, global = true)]
    pub username: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Reset mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResetArg {
    Soft,
    Mixed,
    Hard,
}

impl From<ResetArg> for ResetMode {
    fn from(arg: ResetArg) -> Self {
        match arg {
            ResetArg::Soft => ResetMode::Soft,
            ResetArg::Mixed => ResetMode::Mixed,
            ResetArg::Hard => ResetMode::Hard,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a repository (HEAD on the primary branch)
    Init,

    /// Show a remote, adding it when a url is given
    Remote {
        /// Remote name
        name: String,

        /// Url used when the remote does not exist yet
        url: Option<String>,
    },

    /// Fetch a remote in the background and wait for it
    Fetch {
        /// Remote name (default: configured remote or "origin")
        remote: Option<String>,
    },

    /// Push a branch in the background and wait for it
    #[command(after_help = "\
EXAMPLES:
    gitbridge push master
    gitbridge push feature/x --remote upstream
    gitbridge push +refs/heads/a:refs/heads/b")]
    Push {
        /// Branch name or full refspec
        branch: String,

        /// Remote name (default: configured remote or "origin")
        #[arg(long)]
        remote: Option<String>,
    },

    /// Create a branch at a base commit unless it exists
    Branch {
        /// New branch name
        name: String,

        /// Base commit name (40-char id or reference)
        base: String,
    },

    /// Reset HEAD to a commit
    Reset {
        /// Commit name (40-char id or reference)
        commit: String,

        #[arg(long, value_enum, default_value_t = ResetArg::Mixed)]
        mode: ResetArg,
    },

    /// Merge a commit into the current branch
    #[command(after_help = "\
OUTPUT:
    false      already merged, nothing done
    <id>       fast-forward possible to <id>, nothing done
    true       merged into the index and working tree; commit to finish")]
    Merge {
        /// Commit name (40-char id or reference)
        commit: String,
    },

    /// Commit the index on top of HEAD
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Resolve a name to a commit id
    Lookup {
        /// Commit name (40-char id or reference)
        name: String,
    },

    /// Stage a path if it changed
    Add {
        /// Path relative to the working directory
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["gitbridge", "fetch", "--inline", "--json"]);
        assert!(cli.inline);
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Fetch { remote: None }));
    }

    #[test]
    fn reset_mode_defaults_to_mixed() {
        let cli = parse(&["gitbridge", "reset", "HEAD"]);
        match cli.command {
            Command::Reset { mode, .. } => assert_eq!(ResetMode::from(mode), ResetMode::Mixed),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_reset_mode_rejected() {
        assert!(Cli::try_parse_from(["gitbridge", "reset", "HEAD", "--mode", "keep"]).is_err());
    }

    #[test]
    fn commit_requires_message() {
        assert!(Cli::try_parse_from(["gitbridge", "commit"]).is_err());
    }

    #[test]
    fn push_with_remote() {
        let cli = parse(&["gitbridge", "push", "master", "--remote", "upstream"]);
        match cli.command {
            Command::Push { branch, remote } => {
                assert_eq!(branch, "master");
                assert_eq!(remote.as_deref(), Some("upstream"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
