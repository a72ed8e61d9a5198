//! transport
//!
//! The network side of fetch and push.
//!
//! An [`OperationRequest`] carries everything a worker needs: repository
//! path, remote name, optional push refspec, credentials and trust settings.
//! The worker reopens the repository by path and never touches the caller's
//! handle.
//!
//! # Modules
//!
//! - [`credentials`] - username/password and the credential challenge
//! - [`trust`] - certificate trust configuration

pub mod credentials;
pub mod trust;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

pub use credentials::{Author, Credentials};
pub use trust::{TrustConfig, TrustError, TrustMode};

use crate::bridge::{self, PendingOperation, Runner};
use credentials::CredentialResponder;

/// What the worker does against the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    /// Fetch the remote's configured refspecs.
    Fetch,
    /// Push one refspec.
    Push { refspec: String },
}

impl OperationKind {
    /// Build a push for `branch`.
    ///
    /// A bare branch name becomes `refs/heads/<b>:refs/heads/<b>`; full
    /// refnames and explicit `src:dst` refspecs are used unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use gitbridge::transport::OperationKind;
    ///
    /// assert_eq!(
    ///     OperationKind::push("master"),
    ///     OperationKind::Push { refspec: "refs/heads/master:refs/heads/master".into() }
    /// );
    /// assert_eq!(
    ///     OperationKind::push("+refs/heads/a:refs/heads/b"),
    ///     OperationKind::Push { refspec: "+refs/heads/a:refs/heads/b".into() }
    /// );
    /// ```
    pub fn push(branch: &str) -> Self {
        let refspec = if branch.contains(':') || branch.starts_with("refs/") {
            branch.to_string()
        } else {
            format!("refs/heads/{branch}:refs/heads/{branch}")
        };
        OperationKind::Push { refspec }
    }

    fn verb(&self) -> &'static str {
        match self {
            OperationKind::Fetch => "fetch",
            OperationKind::Push { .. } => "push",
        }
    }
}

/// Everything a worker needs to run one fetch or push.
#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub repo_path: PathBuf,
    pub remote: String,
    pub credentials: Option<Credentials>,
    pub trust: Arc<TrustConfig>,
}

impl OperationRequest {
    /// Short description used in logs and errors.
    pub fn label(&self) -> String {
        match &self.kind {
            OperationKind::Fetch => format!("fetch {}", self.remote),
            OperationKind::Push { refspec } => format!("push {} {}", self.remote, refspec),
        }
    }

    /// Submit to `runner`.
    pub fn submit(self, runner: &dyn Runner) -> PendingOperation {
        let label = self.label();
        runner.submit(&label, bridge::work(move || self.run()))
    }

    /// Run on the current thread. Every handle opened here is dropped
    /// before this returns.
    pub fn run(&self) -> Result<(), String> {
        self.trust.prepare().map_err(|e| e.to_string())?;
        self.execute().map_err(|e| e.message().to_string())
    }

    fn execute(&self) -> Result<(), git2::Error> {
        let repo = git2::Repository::open(&self.repo_path)?;
        let mut remote = repo.find_remote(&self.remote)?;
        info!(remote = %self.remote, url = remote.url().unwrap_or(""), "{} started", self.kind.verb());

        match &self.kind {
            OperationKind::Fetch => {
                let mut options = git2::FetchOptions::new();
                options.remote_callbacks(self.callbacks());
                remote.fetch(&[] as &[&str], Some(&mut options), None)?;
            }
            OperationKind::Push { refspec } => {
                let rejected: RefCell<Vec<String>> = RefCell::new(Vec::new());
                let mut callbacks = self.callbacks();
                callbacks.push_update_reference(|refname, status| {
                    if let Some(status) = status {
                        rejected.borrow_mut().push(format!("{refname}: {status}"));
                    }
                    Ok(())
                });

                let mut options = git2::PushOptions::new();
                options.remote_callbacks(callbacks);
                remote.push(&[refspec.as_str()], Some(&mut options))?;
                drop(options);

                let rejected = rejected.into_inner();
                if !rejected.is_empty() {
                    return Err(git2::Error::from_str(&format!(
                        "remote rejected {}",
                        rejected.join(", ")
                    )));
                }
            }
        }

        info!(remote = %self.remote, "{} finished", self.kind.verb());
        Ok(())
    }

    fn callbacks<'a>(&self) -> git2::RemoteCallbacks<'a> {
        let mut callbacks = git2::RemoteCallbacks::new();

        let mut responder = CredentialResponder::new(self.credentials.clone());
        callbacks.credentials(move |url, _username_from_url, allowed| {
            responder.respond(url, allowed)
        });

        let trust = Arc::clone(&self.trust);
        callbacks.certificate_check(move |_cert, host| trust.check_certificate(host));

        callbacks.transfer_progress(|progress| {
            if progress.received_objects() == progress.total_objects() {
                debug!(
                    objects = progress.total_objects(),
                    bytes = progress.received_bytes(),
                    "objects received"
                );
            }
            true
        });

        callbacks
    }
}
