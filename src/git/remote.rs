//! git::remote
//!
//! Remote handles and the entry points for background fetch and push.

use std::path::PathBuf;
use std::sync::Arc;

use crate::bridge::{PendingOperation, Runner};
use crate::transport::{Credentials, OperationKind, OperationRequest, TrustConfig};

use super::interface::Repo;

/// A named remote of a repository.
///
/// Carries copies of the repository path, credentials and trust settings so
/// an operation started from it can run on another thread after the
/// repository handle is gone.
#[derive(Debug, Clone)]
pub struct Remote {
    name: String,
    url: Option<String>,
    repo_path: PathBuf,
    credentials: Option<Credentials>,
    trust: Arc<TrustConfig>,
}

impl Remote {
    pub(crate) fn new(name: &str, url: Option<&str>, repo: &Repo) -> Self {
        let options = repo.options();
        Self {
            name: name.to_string(),
            url: url.map(str::to_string),
            repo_path: repo.path().to_path_buf(),
            credentials: options.credentials.clone(),
            trust: Arc::clone(&options.trust),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Start a fetch of the remote's configured refspecs.
    ///
    /// Failures (network, authentication, certificates) surface through the
    /// returned handle, never from this call.
    pub fn fetch(&self, runner: &dyn Runner) -> PendingOperation {
        self.request(OperationKind::Fetch).submit(runner)
    }

    /// Start a push of `branch`.
    ///
    /// A short branch name pushes `refs/heads/<branch>` to the same name on
    /// the remote.
    pub fn push(&self, branch: &str, runner: &dyn Runner) -> PendingOperation {
        self.request(OperationKind::push(branch)).submit(runner)
    }

    fn request(&self, kind: OperationKind) -> OperationRequest {
        OperationRequest {
            kind,
            repo_path: self.repo_path.clone(),
            remote: self.name.clone(),
            credentials: self.credentials.clone(),
            trust: Arc::clone(&self.trust),
        }
    }
}
