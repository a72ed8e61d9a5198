//! git::interface
//!
//! Repository handle implementation using git2.
//!
//! This module is the **single doorway** to repository operations. Every
//! synchronous operation (init/open, remote, branch, reset, commit, lookup,
//! add) goes through [`Repo`], which normalizes git2 failures into typed
//! [`GitError`] variants carrying libgit2's own error text.
//!
//! # Name Resolution
//!
//! Wherever an operation takes a commit name, a string of exactly 40 hex
//! digits is used as a literal id; anything else is looked up as a
//! reference (`HEAD`, `refs/heads/master`, ...).
//!
//! # Example
//!
//! ```no_run
//! use gitbridge::git::{Repo, RepoOptions};
//! use gitbridge::transport::{Author, Credentials};
//! use std::path::Path;
//!
//! let creds = Credentials::new("alice", "secret")
//!     .with_author(Author::new("Alice", "alice@example.com"));
//! let repo = Repo::open(Path::new("/tmp/project"), RepoOptions::default().with_credentials(creds))?;
//!
//! repo.add("README.md")?;
//! let id = repo.commit("init")?;
//! assert_eq!(repo.lookup("HEAD")?, id);
//! # Ok::<(), gitbridge::git::GitError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::remote::Remote;
use crate::core::types::{BranchName, CommitName, Oid, ResetMode, TypeError};
use crate::transport::{Credentials, TrustConfig};

/// Errors from repository operations.
///
/// Variants follow the failure categories callers handle distinctly:
/// resolution, I/O, merge conflicts and usage errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository could not be created.
    #[error("git init error: {message}")]
    Init { path: PathBuf, message: String },

    /// Repository could not be opened (or created on fallback).
    #[error("git open error: {message}")]
    Open { path: PathBuf, message: String },

    /// A commit name could not be resolved to an id.
    #[error("git reference lookup error: {message}")]
    RefLookup { name: String, message: String },

    /// The id resolved but is not a readable commit.
    #[error("git commit lookup error: {message}")]
    CommitLookup { name: String, message: String },

    /// Remote lookup failed and could not be created.
    #[error("git remote add error: {message}")]
    Remote { name: String, message: String },

    /// Branch name is invalid or lookup failed.
    #[error("git branch lookup error: {message}")]
    BranchLookup { name: String, message: String },

    /// Branch could not be created.
    #[error("git branch create error: {message}")]
    BranchCreate { name: String, message: String },

    #[error("git reset error: {message}")]
    Reset { message: String },

    /// No common ancestor, or the walk failed.
    #[error("git merge base error: {message}")]
    MergeBase { message: String },

    #[error("git annotated commit lookup error: {message}")]
    AnnotatedCommit { message: String },

    #[error("git merge error: {message}")]
    Merge { message: String },

    /// The merge left conflicts in the index. The merge state is kept.
    #[error("git merge has conflicts")]
    MergeConflict,

    #[error("git index error: {message}")]
    Index { message: String },

    #[error("git write tree error: {message}")]
    WriteTree { message: String },

    #[error("git tree lookup error: {message}")]
    TreeLookup { message: String },

    #[error("git commit error: {message}")]
    Commit { message: String },

    /// Commit needs an author and none is configured.
    #[error("no author identity: set an author on the credentials or configure user.name and user.email")]
    MissingIdentity,

    #[error("git status error: {message}")]
    Status { path: String, message: String },

    #[error("git add error: {message}")]
    Add { path: String, message: String },

    #[error(transparent)]
    Type(#[from] TypeError),
}

fn text(err: &git2::Error) -> String {
    err.message().to_string()
}

/// Default primary branch; the merge tip is always read from this branch.
pub const DEFAULT_PRIMARY_BRANCH: &str = "master";

/// Settings captured by a [`Repo`] handle.
#[derive(Debug, Clone)]
pub struct RepoOptions {
    /// Transport credentials and commit author
    pub credentials: Option<Credentials>,
    /// Branch whose tip merges compare against
    pub primary_branch: BranchName,
    /// Certificate trust for fetch/push
    pub trust: Arc<TrustConfig>,
}

impl Default for RepoOptions {
    fn default() -> Self {
        Self {
            credentials: None,
            primary_branch: BranchName::new(DEFAULT_PRIMARY_BRANCH)
                .unwrap_or_else(|_| unreachable!("default branch name is valid")),
            trust: Arc::new(TrustConfig::default()),
        }
    }
}

impl RepoOptions {
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_primary_branch(mut self, branch: BranchName) -> Self {
        self.primary_branch = branch;
        self
    }

    pub fn with_trust(mut self, trust: Arc<TrustConfig>) -> Self {
        self.trust = trust;
        self
    }
}

/// A repository handle.
///
/// Holds one git2 repository plus the credentials and trust settings that
/// remotes created from it inherit. Callers serialize writes to the same
/// on-disk repository; a background fetch or push opens its own handle.
pub struct Repo {
    repo: git2::Repository,
    options: RepoOptions,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("path", &self.repo.path())
            .field("primary_branch", &self.options.primary_branch)
            .finish()
    }
}

impl Repo {
    // =========================================================================
    // Opening
    // =========================================================================

    /// Create a repository at `path`.
    ///
    /// HEAD starts on the primary branch so the first commit creates it.
    ///
    /// # Errors
    ///
    /// - [`GitError::Init`] if libgit2 refuses to create the repository
    pub fn init(path: &Path, options: RepoOptions) -> Result<Self, GitError> {
        let repo = Self::init_raw(path, &options.primary_branch).map_err(|e| GitError::Init {
            path: path.to_path_buf(),
            message: text(&e),
        })?;
        info!(path = %path.display(), "initialized repository");
        Ok(Self { repo, options })
    }

    /// Open the repository at `path`, creating it if none exists.
    ///
    /// # Errors
    ///
    /// - [`GitError::Open`] if the path is neither openable nor initializable
    pub fn open(path: &Path, options: RepoOptions) -> Result<Self, GitError> {
        let repo = match git2::Repository::open(path) {
            Ok(repo) => repo,
            Err(open_err) => {
                debug!(path = %path.display(), error = %open_err, "open failed, initializing");
                Self::init_raw(path, &options.primary_branch).map_err(|e| GitError::Open {
                    path: path.to_path_buf(),
                    message: text(&e),
                })?
            }
        };
        Ok(Self { repo, options })
    }

    fn init_raw(path: &Path, primary: &BranchName) -> Result<git2::Repository, git2::Error> {
        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head(primary.as_str());
        git2::Repository::init_opts(path, &opts)
    }

    /// Path to the `.git` directory.
    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// Path to the working directory, if any.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Credentials captured at open time.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.options.credentials.as_ref()
    }

    /// Branch whose tip merges are compared against.
    pub fn primary_branch(&self) -> &BranchName {
        &self.options.primary_branch
    }

    pub(crate) fn options(&self) -> &RepoOptions {
        &self.options
    }

    pub(crate) fn raw(&self) -> &git2::Repository {
        &self.repo
    }

    // =========================================================================
    // Name Resolution
    // =========================================================================

    /// Resolve a commit name to a raw id.
    pub(crate) fn resolve_id(&self, name: &str) -> Result<git2::Oid, GitError> {
        let resolved = match CommitName::classify(name) {
            CommitName::Literal(hex) => git2::Oid::from_str(hex),
            CommitName::Reference(refname) => self.repo.refname_to_id(refname),
        };
        resolved.map_err(|e| GitError::RefLookup {
            name: name.to_string(),
            message: text(&e),
        })
    }

    /// Resolve a commit name and load the commit.
    pub(crate) fn find_commit(&self, name: &str) -> Result<git2::Commit<'_>, GitError> {
        let id = self.resolve_id(name)?;
        self.repo.find_commit(id).map_err(|e| GitError::CommitLookup {
            name: name.to_string(),
            message: text(&e),
        })
    }

    /// Resolve `name` to a commit id.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefLookup`] if the reference does not exist
    pub fn lookup(&self, name: &str) -> Result<Oid, GitError> {
        self.resolve_id(name).map(Oid::from_git2)
    }

    // =========================================================================
    // Remotes and Branches
    // =========================================================================

    /// Look up remote `name`, creating it with `url` when it does not exist.
    ///
    /// # Errors
    ///
    /// - [`GitError::Remote`] when the remote is missing and no url was given,
    ///   or creation fails
    pub fn remote(&self, name: &str, url: Option<&str>) -> Result<Remote, GitError> {
        let remote = match self.repo.find_remote(name) {
            Ok(remote) => remote,
            Err(_) => {
                let url = url.ok_or_else(|| GitError::Remote {
                    name: name.to_string(),
                    message: "no url".to_string(),
                })?;
                let created = self.repo.remote(name, url).map_err(|e| GitError::Remote {
                    name: name.to_string(),
                    message: text(&e),
                })?;
                info!(remote = name, url, "added remote");
                created
            }
        };

        Ok(Remote::new(
            remote.name().unwrap_or(name),
            remote.url(),
            self,
        ))
    }

    /// Create local branch `name` at `base` unless it already exists.
    ///
    /// Returns `true` if the branch was created, `false` if it existed. An
    /// existing branch is never moved.
    ///
    /// # Errors
    ///
    /// - [`GitError::BranchLookup`] for an invalid branch name
    /// - [`GitError::RefLookup`] / [`GitError::CommitLookup`] if `base` does not resolve
    /// - [`GitError::BranchCreate`] if creation fails
    pub fn branch(&self, name: &str, base: &str) -> Result<bool, GitError> {
        match self.repo.find_branch(name, git2::BranchType::Local) {
            Ok(_) => Ok(false),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                let commit = self.find_commit(base)?;
                self.repo
                    .branch(name, &commit, false)
                    .map_err(|e| GitError::BranchCreate {
                        name: name.to_string(),
                        message: text(&e),
                    })?;
                info!(branch = name, base, "created branch");
                Ok(true)
            }
            Err(e) => Err(GitError::BranchLookup {
                name: name.to_string(),
                message: text(&e),
            }),
        }
    }

    // =========================================================================
    // Working Tree Mutations
    // =========================================================================

    /// Reset HEAD to the commit `name`.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefLookup`] / [`GitError::CommitLookup`] if `name` does not resolve
    /// - [`GitError::Reset`] if libgit2 fails; repository state is left as is
    pub fn reset(&self, name: &str, mode: ResetMode) -> Result<(), GitError> {
        let commit = self.find_commit(name)?;
        self.repo
            .reset(commit.as_object(), mode.to_git2(), None)
            .map_err(|e| GitError::Reset { message: text(&e) })?;
        info!(target_commit = %commit.id(), %mode, "reset");
        Ok(())
    }

    /// Stage `path` if it changed in the working tree.
    ///
    /// Returns the staged paths; empty when `path` has no working tree
    /// change. A deleted file is removed from the index.
    ///
    /// # Errors
    ///
    /// - [`GitError::Status`] if the path's status cannot be read
    /// - [`GitError::Add`] if staging or writing the index fails
    pub fn add(&self, path: &str) -> Result<Vec<String>, GitError> {
        let status = self
            .repo
            .status_file(Path::new(path))
            .map_err(|e| GitError::Status {
                path: path.to_string(),
                message: text(&e),
            })?;

        let changed =
            git2::Status::WT_MODIFIED | git2::Status::WT_DELETED | git2::Status::WT_NEW;
        if !status.intersects(changed) {
            debug!(path, ?status, "nothing to stage");
            return Ok(Vec::new());
        }

        let add_err = |e: git2::Error| GitError::Add {
            path: path.to_string(),
            message: text(&e),
        };
        let mut index = self.repo.index().map_err(add_err)?;
        let mut staged = Vec::new();

        if status.contains(git2::Status::WT_DELETED) {
            index.remove_path(Path::new(path)).map_err(add_err)?;
            staged.push(path.to_string());
        } else {
            let mut on_match = |matched: &Path, _spec: &[u8]| -> i32 {
                staged.push(matched.to_string_lossy().into_owned());
                0
            };
            index
                .add_all(
                    [path].iter(),
                    git2::IndexAddOption::FORCE,
                    Some(&mut on_match as &mut git2::IndexMatchedPath),
                )
                .map_err(add_err)?;
        }

        index.write().map_err(add_err)?;
        debug!(path, staged = staged.len(), "staged");
        Ok(staged)
    }

    /// Commit the index on top of HEAD.
    ///
    /// The author and committer come from the credentials' author, falling
    /// back to the repository's configured signature. On an unborn HEAD the
    /// commit has no parents. When a merge is in progress, the merged heads
    /// become additional parents and the merge state is cleaned up.
    ///
    /// # Errors
    ///
    /// - [`GitError::MissingIdentity`] if no author is available
    /// - [`GitError::Index`], [`GitError::WriteTree`], [`GitError::TreeLookup`],
    ///   [`GitError::Commit`] for the corresponding libgit2 failures
    pub fn commit(&self, message: &str) -> Result<Oid, GitError> {
        let signature = self.signature()?;

        let head = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(|e| GitError::CommitLookup {
                name: "HEAD".to_string(),
                message: text(&e),
            })?),
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                None
            }
            Err(e) => {
                return Err(GitError::RefLookup {
                    name: "HEAD".to_string(),
                    message: text(&e),
                })
            }
        };

        let merge_heads = self.merge_heads()?;

        let mut index = self
            .repo
            .index()
            .map_err(|e| GitError::Index { message: text(&e) })?;
        let tree_id = index
            .write_tree()
            .map_err(|e| GitError::WriteTree { message: text(&e) })?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::TreeLookup { message: text(&e) })?;

        let mut parents: Vec<git2::Commit<'_>> = head.into_iter().collect();
        parents.extend(merge_heads);
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let id = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .map_err(|e| GitError::Commit { message: text(&e) })?;

        if parents.len() > 1 {
            self.repo
                .cleanup_state()
                .map_err(|e| GitError::Commit { message: text(&e) })?;
        }

        let id = Oid::from_git2(id);
        info!(commit = %id, parents = parents.len(), "committed");
        Ok(id)
    }

    fn signature(&self) -> Result<git2::Signature<'static>, GitError> {
        if let Some(author) = self.credentials().and_then(Credentials::author) {
            return git2::Signature::now(&author.name, &author.email)
                .map_err(|e| GitError::Commit { message: text(&e) });
        }
        self.repo.signature().map_err(|_| GitError::MissingIdentity)
    }

    /// Commits recorded in MERGE_HEAD, if a merge is in progress.
    fn merge_heads(&self) -> Result<Vec<git2::Commit<'_>>, GitError> {
        if self.repo.state() != git2::RepositoryState::Merge {
            return Ok(Vec::new());
        }

        // mergehead_foreach needs a mutable handle
        let mut scratch = git2::Repository::open(self.repo.path())
            .map_err(|e| GitError::Commit { message: text(&e) })?;
        let mut ids = Vec::new();
        scratch
            .mergehead_foreach(|id| {
                ids.push(*id);
                true
            })
            .map_err(|e| GitError::Commit { message: text(&e) })?;

        ids.into_iter()
            .map(|id| {
                self.repo.find_commit(id).map_err(|e| GitError::CommitLookup {
                    name: id.to_string(),
                    message: text(&e),
                })
            })
            .collect()
    }
}
