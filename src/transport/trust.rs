//! transport::trust
//!
//! Certificate trust configuration for https transports.
//!
//! A [`TrustConfig`] is built once (usually from the command line or the
//! global config file), wrapped in an `Arc`, and handed to every transport
//! built for an operation.
//!
//! # Modes
//!
//! | mode       | effect                                               |
//! |------------|------------------------------------------------------|
//! | `noverify` | accept any server certificate                        |
//! | `dir`      | verify against the CA certificates in a directory    |
//! | `file`     | verify against a CA bundle file                      |
//! | `system`   | verify against the TLS backend's platform trust store |
//!
//! libgit2 keeps CA locations in process-wide state, and the TLS backend
//! only ever adds to them. `dir` and `file` are applied there when a
//! transport is prepared. Once a location is loaded, any other verifying
//! mode in the same process fails with [`TrustError::Conflict`] instead of
//! silently trusting the stale location. `noverify` never reads it.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, warn};

/// Errors from certificate trust configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrustError {
    #[error("unknown certificate mode '{0}', expected noverify, dir, file or system")]
    UnknownMode(String),

    #[error("certificate mode '{mode}' requires a path")]
    MissingPath { mode: String },

    #[error("certificate path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("failed to apply certificate location {path}: {message}")]
    Apply { path: PathBuf, message: String },

    #[error(
        "certificate location {loaded} is already loaded in this process, cannot switch to {requested}"
    )]
    Conflict { loaded: PathBuf, requested: String },
}

/// Mode name without its path, as written on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustModeName {
    NoVerify,
    Dir,
    File,
    System,
}

impl FromStr for TrustModeName {
    type Err = TrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "noverify" => Ok(TrustModeName::NoVerify),
            "dir" => Ok(TrustModeName::Dir),
            "file" => Ok(TrustModeName::File),
            "system" => Ok(TrustModeName::System),
            other => Err(TrustError::UnknownMode(other.to_string())),
        }
    }
}

/// How server certificates are checked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrustMode {
    /// Accept every certificate.
    NoVerify,
    /// CA certificates in a directory.
    Dir(PathBuf),
    /// CA bundle file.
    File(PathBuf),
    /// Platform defaults of the TLS backend.
    #[default]
    System,
}

/// Immutable trust settings shared by every transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrustConfig {
    mode: TrustMode,
}

/// Location pushed into libgit2's global options, if any.
static APPLIED: Mutex<Option<TrustMode>> = Mutex::new(None);

fn location(mode: &TrustMode) -> &Path {
    match mode {
        TrustMode::Dir(path) | TrustMode::File(path) => path,
        TrustMode::NoVerify | TrustMode::System => Path::new(""),
    }
}

impl TrustConfig {
    pub fn new(mode: TrustMode) -> Self {
        Self { mode }
    }

    /// Build from a mode name and an optional path.
    ///
    /// # Errors
    ///
    /// - [`TrustError::UnknownMode`] for an unrecognized mode
    /// - [`TrustError::MissingPath`] when `dir` or `file` has no path
    /// - [`TrustError::PathNotFound`] when the path does not exist
    ///
    /// # Example
    ///
    /// ```
    /// use gitbridge::transport::{TrustConfig, TrustMode};
    ///
    /// let config = TrustConfig::from_mode("noverify", None).unwrap();
    /// assert_eq!(config.mode(), &TrustMode::NoVerify);
    /// assert!(TrustConfig::from_mode("dir", None).is_err());
    /// ```
    pub fn from_mode(mode: &str, path: Option<&Path>) -> Result<Self, TrustError> {
        let mode = match mode.parse::<TrustModeName>()? {
            TrustModeName::NoVerify => TrustMode::NoVerify,
            TrustModeName::System => TrustMode::System,
            TrustModeName::Dir => TrustMode::Dir(Self::existing(mode, path)?),
            TrustModeName::File => TrustMode::File(Self::existing(mode, path)?),
        };
        Ok(Self { mode })
    }

    fn existing(mode: &str, path: Option<&Path>) -> Result<PathBuf, TrustError> {
        let path = path.ok_or_else(|| TrustError::MissingPath {
            mode: mode.to_string(),
        })?;
        if !path.exists() {
            return Err(TrustError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(path.to_path_buf())
    }

    pub fn mode(&self) -> &TrustMode {
        &self.mode
    }

    /// Whether server certificates are verified at all.
    pub fn verifies(&self) -> bool {
        !matches!(self.mode, TrustMode::NoVerify)
    }

    /// Push CA locations into libgit2 before a transport is built.
    pub(crate) fn prepare(&self) -> Result<(), TrustError> {
        self.prepare_with(&APPLIED, |path, is_dir| {
            // SAFETY: the caller holds the APPLIED lock, which serializes
            // writers; libgit2 reads the location when it builds a TLS stream.
            unsafe {
                if is_dir {
                    git2::opts::set_ssl_cert_dir(path)
                } else {
                    git2::opts::set_ssl_cert_file(path)
                }
            }
        })
    }

    fn prepare_with<F>(
        &self,
        applied: &Mutex<Option<TrustMode>>,
        apply: F,
    ) -> Result<(), TrustError>
    where
        F: FnOnce(&Path, bool) -> Result<(), git2::Error>,
    {
        if !self.verifies() {
            return Ok(());
        }

        let mut applied = applied.lock().unwrap_or_else(PoisonError::into_inner);
        if applied.as_ref() == Some(&self.mode) {
            return Ok(());
        }
        if let Some(loaded) = applied.as_ref() {
            return Err(TrustError::Conflict {
                loaded: location(loaded).to_path_buf(),
                requested: self.describe(),
            });
        }

        let (path, is_dir) = match &self.mode {
            TrustMode::Dir(path) => (path, true),
            TrustMode::File(path) => (path, false),
            TrustMode::NoVerify | TrustMode::System => return Ok(()),
        };

        debug!(path = %path.display(), is_dir, "setting CA certificate location");
        apply(path, is_dir).map_err(|e| TrustError::Apply {
            path: path.clone(),
            message: e.message().to_string(),
        })?;

        *applied = Some(self.mode.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.mode {
            TrustMode::NoVerify => "noverify".to_string(),
            TrustMode::System => "system".to_string(),
            TrustMode::Dir(path) => format!("dir {}", path.display()),
            TrustMode::File(path) => format!("file {}", path.display()),
        }
    }

    /// Certificate check callback body.
    pub(crate) fn check_certificate(
        &self,
        host: &str,
    ) -> Result<git2::CertificateCheckStatus, git2::Error> {
        if self.verifies() {
            Ok(git2::CertificateCheckStatus::CertificatePassthrough)
        } else {
            warn!(host, "accepting server certificate without verification");
            Ok(git2::CertificateCheckStatus::CertificateOk)
        }
    }
}
