//! cli
//!
//! Command-line host for the library.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging and libgit2 tracing
//! - Build repository options from config and flags
//! - Delegate to command handlers
//!
//! Flags override repo config, which overrides global config.

pub mod args;
pub mod commands;

pub use args::{Cli, Command};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use tracing::{debug, warn};

use crate::bridge::ExecutionMode;
use crate::core::config::Config;
use crate::git::{Repo, RepoOptions};
use crate::trace::{self, TraceLevel};
use crate::transport::{Credentials, TrustConfig};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::{self, PromptError};

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    pub verbosity: Verbosity,
    /// Print results as JSON.
    pub json: bool,
    /// How fetch and push run.
    pub mode: ExecutionMode,
    pub trace: Option<String>,
    pub certs: Option<String>,
    pub cert_path: Option<PathBuf>,
    pub username: Option<String>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            verbosity: Verbosity::Normal,
            json: false,
            mode: ExecutionMode::Background,
            trace: None,
            certs: None,
            cert_path: None,
            username: None,
        }
    }
}

/// Whether a command talks to a remote and may need a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Local,
    Network,
}

/// A repository opened with everything resolved from config and flags.
pub struct Session {
    pub repo: Repo,
    pub config: Config,
    pub poll_interval: Duration,
}

impl Context {
    /// Directory the command runs in.
    pub fn repo_path(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    /// Open (or create) the repository and apply config and flags.
    pub fn session(&self, access: Access) -> Result<Session> {
        let path = self.repo_path()?;
        let config = Config::load(Some(&path))
            .context("Failed to load configuration")?
            .config;

        self.apply_trace(&config)?;

        let options = RepoOptions {
            credentials: self.credentials(&config, access)?,
            primary_branch: config.primary_branch_name()?,
            trust: Arc::new(self.trust(&config)?),
        };

        let repo = Repo::open(&path, options)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;

        Ok(Session {
            repo,
            poll_interval: config.poll_interval(),
            config,
        })
    }

    fn apply_trace(&self, config: &Config) -> Result<()> {
        let level = match &self.trace {
            Some(name) => Some(name.parse::<TraceLevel>()?),
            None => config.trace_level(),
        };
        if let Some(level) = level {
            trace::set_level(level).context("Failed to set libgit2 trace level")?;
        }
        Ok(())
    }

    fn trust(&self, config: &Config) -> Result<TrustConfig> {
        match &self.certs {
            Some(mode) => Ok(TrustConfig::from_mode(mode, self.cert_path.as_deref())?),
            None => Ok(config.trust()?),
        }
    }

    /// Credentials from flags and config.
    ///
    /// The password is only requested for network commands. Local commands
    /// still carry the configured author for commits.
    ///
    /// A network command that can neither read the password from the
    /// environment nor prompt for it runs without credentials, so remotes
    /// that never challenge still work.
    fn credentials(&self, config: &Config, access: Access) -> Result<Option<Credentials>> {
        let username = self
            .username
            .as_deref()
            .or_else(|| config.username())
            .map(str::to_string);

        let credentials = match (username, access) {
            (Some(user), Access::Network) => {
                let password = prompts::password(&user);
                network_credentials(user, password)?
            }
            (None, Access::Network) => None,
            (Some(user), Access::Local) => Some(Credentials::new(user, "")),
            (None, Access::Local) => config.author().map(|_| Credentials::new("", "")),
        };

        Ok(match (credentials, config.author()) {
            (Some(creds), Some(author)) => Some(creds.with_author(author)),
            (creds, _) => creds,
        })
    }
}

fn network_credentials(
    username: String,
    password: Result<String, PromptError>,
) -> Result<Option<Credentials>> {
    match password {
        Ok(password) => Ok(Some(Credentials::new(username, password))),
        Err(PromptError::NotInteractive) => {
            warn!(
                username = %username,
                "no password available, continuing without credentials"
            );
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    output::init_logging(verbosity);

    let ctx = Context {
        cwd: cli.cwd.clone(),
        verbosity,
        json: cli.json,
        mode: if cli.inline {
            ExecutionMode::Inline
        } else {
            ExecutionMode::Background
        },
        trace: cli.trace.clone(),
        certs: cli.certs.clone(),
        cert_path: cli.cert_path.clone(),
        username: cli.username.clone(),
    };
    debug!(mode = ?ctx.mode, cwd = ?ctx.cwd, "starting");

    commands::dispatch(cli.command, &ctx)
}
