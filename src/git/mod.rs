//! git
//!
//! Repository operations on top of `git2`.
//!
//! # Architecture
//!
//! [`Repo`] is the only place that opens repositories for synchronous work.
//! Fetch and push are started from a [`Remote`] and run through the
//! [`bridge`](crate::bridge), each worker opening its own handle from the
//! repository path.
//!
//! # Responsibilities
//!
//! - Init/open with open-or-create fallback
//! - Commit-name resolution (literal hex id or reference)
//! - Remote and branch creation
//! - Reset, stage, commit
//! - Merge classification and true merges
//!
//! # Example
//!
//! ```no_run
//! use gitbridge::bridge::ThreadedRunner;
//! use gitbridge::git::{MergeOutcome, Repo, RepoOptions};
//! use std::path::Path;
//!
//! let repo = Repo::open(Path::new("."), RepoOptions::default())?;
//! let mut fetch = repo.remote("origin", None)?.fetch(&ThreadedRunner);
//! fetch.wait()?;
//!
//! match repo.merge("refs/remotes/origin/master")? {
//!     MergeOutcome::FastForward(id) => println!("can fast-forward to {id}"),
//!     other => println!("{other}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod interface;
mod merge;
mod remote;

pub use interface::{GitError, Repo, RepoOptions, DEFAULT_PRIMARY_BRANCH};
pub use merge::{classify, MergeClass, MergeOutcome};
pub use remote::Remote;
