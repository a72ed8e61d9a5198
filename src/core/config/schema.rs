//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$GITBRIDGE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitbridge/config.toml`
//! 3. `~/.gitbridge/config.toml`
//!
//! # Repo Config
//!
//! Located at `.git/gitbridge/config.toml`.
//!
//! # Validation
//!
//! Values are checked after parsing: trace levels and certificate modes
//! must be known names, branch names must be valid.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;
use crate::trace::TraceLevel;
use crate::transport::trust::TrustModeName;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// trace = "none"
/// poll_interval_ms = 50
///
/// [certs]
/// mode = "file"
/// path = "/etc/ssl/certs/ca-certificates.crt"
///
/// [author]
/// name = "Alice"
/// email = "alice@example.com"
///
/// [credentials]
/// username = "alice"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// libgit2 trace level name
    pub trace: Option<String>,

    /// Delay between completion checks of background operations
    pub poll_interval_ms: Option<u64>,

    /// Certificate trust
    pub certs: Option<CertsConfig>,

    /// Commit identity
    pub author: Option<AuthorConfig>,

    /// Transport credentials (password is never stored)
    pub credentials: Option<CredentialsConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(trace) = &self.trace {
            trace
                .parse::<TraceLevel>()
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }

        if self.poll_interval_ms == Some(0) {
            return Err(ConfigError::InvalidValue(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        if let Some(certs) = &self.certs {
            certs.validate()?;
        }

        if let Some(author) = &self.author {
            if author.name.is_empty() || author.email.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "author name and email cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// remote = "origin"
/// primary_branch = "master"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Remote name (default: "origin")
    pub remote: Option<String>,

    /// Branch merges are compared against (default: "master")
    pub primary_branch: Option<String>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(branch) = &self.primary_branch {
            BranchName::new(branch).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid primary branch name: {}", e))
            })?;
        }

        if let Some(remote) = &self.remote {
            if remote.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "remote cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Certificate trust settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CertsConfig {
    /// "noverify", "dir", "file" or "system"
    pub mode: Option<String>,

    /// CA directory or bundle for "dir" / "file"
    pub path: Option<std::path::PathBuf>,
}

impl CertsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(mode) = &self.mode else {
            return Ok(());
        };
        let name = mode
            .parse::<TrustModeName>()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        if matches!(name, TrustModeName::Dir | TrustModeName::File) && self.path.is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "certs mode '{}' requires a path",
                mode
            )));
        }
        Ok(())
    }
}

/// Commit identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.trace.is_none());
            assert!(config.certs.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn valid_trace_level() {
            let config = GlobalConfig {
                trace: Some("debug".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn invalid_trace_level() {
            let config = GlobalConfig {
                trace: Some("loud".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn zero_poll_interval_rejected() {
            let config = GlobalConfig {
                poll_interval_ms: Some(0),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn empty_author_rejected() {
            let config = GlobalConfig {
                author: Some(AuthorConfig {
                    name: "Alice".to_string(),
                    email: String::new(),
                }),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn parses_full_file() {
            let config: GlobalConfig = toml::from_str(
                r#"
                trace = "info"
                poll_interval_ms = 20

                [certs]
                mode = "noverify"

                [author]
                name = "Alice"
                email = "alice@example.com"

                [credentials]
                username = "alice"
                "#,
            )
            .unwrap();

            assert_eq!(config.poll_interval_ms, Some(20));
            assert_eq!(config.author.as_ref().unwrap().name, "Alice");
            assert_eq!(
                config.credentials.unwrap().username.as_deref(),
                Some("alice")
            );
            assert!(config.certs.unwrap().validate().is_ok());
        }

        #[test]
        fn password_is_not_a_field() {
            let result: Result<GlobalConfig, _> = toml::from_str(
                r#"
                [credentials]
                username = "alice"
                password = "hunter2"
                "#,
            );
            assert!(result.is_err());
        }
    }

    mod repo_config {
        use super::*;

        #[test]
        fn valid_primary_branch() {
            let config = RepoConfig {
                primary_branch: Some("main".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }

        #[test]
        fn invalid_primary_branch() {
            let config = RepoConfig {
                primary_branch: Some("invalid..name".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn empty_remote_rejected() {
            let config = RepoConfig {
                remote: Some("".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn reject_unknown_fields() {
            let result: Result<RepoConfig, _> = toml::from_str("trunk = \"main\"");
            assert!(result.is_err());
        }
    }

    mod certs_config {
        use super::*;

        #[test]
        fn file_mode_needs_path() {
            let config = CertsConfig {
                mode: Some("file".to_string()),
                path: None,
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn unknown_mode_rejected() {
            let config = CertsConfig {
                mode: Some("pinned".to_string()),
                path: None,
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn system_needs_nothing() {
            let config = CertsConfig {
                mode: Some("system".to_string()),
                path: None,
            };
            assert!(config.validate().is_ok());
        }
    }
}
