//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Two configuration scopes:
//! - **Global**: user-level settings (trace level, certificates, author,
//!   username, poll interval)
//! - **Repo**: per-repository settings (remote, primary branch)
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Example
//!
//! ```no_run
//! use gitbridge::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo"))).unwrap().config;
//! println!("Remote: {}", config.remote());
//! println!("Primary branch: {}", config.primary_branch());
//! ```

pub mod schema;

pub use schema::{AuthorConfig, CertsConfig, CredentialsConfig, GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::bridge::DEFAULT_POLL_INTERVAL;
use crate::core::types::BranchName;
use crate::git::DEFAULT_PRIMARY_BRANCH;
use crate::trace::TraceLevel;
use crate::transport::{Author, TrustConfig, TrustError};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Trust(#[from] TrustError),
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence and defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if found)
    pub repo: Option<RepoConfig>,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// If `repo_path` (a working directory) is given, its repo config is
    /// loaded too.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. Missing files are not an error.
    pub fn load(repo_path: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(Self::find_global().as_deref(), repo_path)
    }

    /// Load from an explicit global file instead of searching for one.
    pub fn load_from(
        global_file: Option<&Path>,
        repo_path: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let (global, global_path) = match global_file {
            Some(path) if path.exists() => (read_toml::<GlobalConfig>(path)?, Some(path.to_path_buf())),
            _ => (GlobalConfig::default(), None),
        };

        let repo_file = repo_path.map(Self::repo_config_path).filter(|p| p.exists());
        let repo = repo_file.as_deref().map(read_toml::<RepoConfig>).transpose()?;

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        debug!(global = ?global_path, repo = ?repo_file, "config loaded");
        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path,
                repo_path: repo_file,
            },
        })
    }

    /// First existing global config file.
    fn find_global() -> Option<PathBuf> {
        let candidates = [
            std::env::var_os("GITBRIDGE_CONFIG").map(PathBuf::from),
            std::env::var_os("XDG_CONFIG_HOME")
                .map(|xdg| PathBuf::from(xdg).join("gitbridge/config.toml")),
            dirs::home_dir().map(|home| home.join(".gitbridge/config.toml")),
        ];
        candidates.into_iter().flatten().find(|path| path.exists())
    }

    /// Repo config location for a working directory.
    ///
    /// Returns `.git/gitbridge/config.toml` relative to `repo_path`.
    pub fn repo_config_path(repo_path: &Path) -> PathBuf {
        repo_path.join(".git/gitbridge/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Remote name; defaults to "origin".
    pub fn remote(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.remote.as_deref())
            .unwrap_or("origin")
    }

    /// Primary branch name; defaults to "master".
    pub fn primary_branch(&self) -> &str {
        self.repo
            .as_ref()
            .and_then(|r| r.primary_branch.as_deref())
            .unwrap_or(DEFAULT_PRIMARY_BRANCH)
    }

    /// Primary branch as a validated name.
    pub fn primary_branch_name(&self) -> Result<BranchName, ConfigError> {
        BranchName::new(self.primary_branch())
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    /// Poll interval for background operations.
    pub fn poll_interval(&self) -> Duration {
        self.global
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    /// Configured libgit2 trace level, if any.
    pub fn trace_level(&self) -> Option<TraceLevel> {
        self.global.trace.as_deref().and_then(|t| t.parse().ok())
    }

    /// Certificate trust; system defaults when unset.
    pub fn trust(&self) -> Result<TrustConfig, ConfigError> {
        match &self.global.certs {
            Some(CertsConfig {
                mode: Some(mode),
                path,
            }) => Ok(TrustConfig::from_mode(mode, path.as_deref())?),
            _ => Ok(TrustConfig::default()),
        }
    }

    pub fn author(&self) -> Option<Author> {
        self.global
            .author
            .as_ref()
            .map(|a| Author::new(a.name.clone(), a.email.clone()))
    }

    pub fn username(&self) -> Option<&str> {
        self.global
            .credentials
            .as_ref()
            .and_then(|c| c.username.as_deref())
    }

    /// Path of the global config file that was loaded.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path of the repo config file that was loaded.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
