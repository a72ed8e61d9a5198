//! git::merge
//!
//! Merge classification and merging into the current branch.
//!
//! A merge of target `T` compares three commits: `T`, the tip `P` of the
//! primary branch, and their merge base `B`.
//!
//! | condition | class            | effect                          |
//! |-----------|------------------|---------------------------------|
//! | `B == T`  | already merged   | none                            |
//! | `B == P`  | fast-forward     | none, the target id is reported |
//! | otherwise | merge required   | true merge into the index/tree  |
//!
//! When the target equals the tip both rules hold; "already merged" wins.
//! A fast-forward is reported, never performed: the caller decides whether
//! to move the branch.

use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use super::interface::{GitError, Repo};
use crate::core::types::Oid;

/// Classification of a target against the primary branch tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeClass {
    /// Target is an ancestor of (or equal to) the tip.
    AlreadyMerged,
    /// Tip is an ancestor of the target.
    FastForward,
    /// Histories diverged.
    MergeRequired,
}

/// Classify from the three ids.
///
/// Pure function of its inputs; the merge base must already be computed.
///
/// # Example
///
/// ```
/// use gitbridge::git::{classify, MergeClass};
///
/// assert_eq!(classify("b", "b", "p"), MergeClass::AlreadyMerged);
/// assert_eq!(classify("p", "t", "p"), MergeClass::FastForward);
/// assert_eq!(classify("b", "t", "p"), MergeClass::MergeRequired);
/// ```
pub fn classify<T: PartialEq + ?Sized>(merge_base: &T, target: &T, tip: &T) -> MergeClass {
    if merge_base == target {
        MergeClass::AlreadyMerged
    } else if merge_base == tip {
        MergeClass::FastForward
    } else {
        MergeClass::MergeRequired
    }
}

/// Result of [`Repo::merge`].
///
/// Serializes as `false`, the target's hex id, or `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Nothing to do.
    AlreadyMerged,
    /// The branch can be moved to this id.
    FastForward(Oid),
    /// A true merge was performed into the index and working tree.
    Merged,
}

impl MergeOutcome {
    pub fn class(&self) -> MergeClass {
        match self {
            MergeOutcome::AlreadyMerged => MergeClass::AlreadyMerged,
            MergeOutcome::FastForward(_) => MergeClass::FastForward,
            MergeOutcome::Merged => MergeClass::MergeRequired,
        }
    }
}

impl Serialize for MergeOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MergeOutcome::AlreadyMerged => serializer.serialize_bool(false),
            MergeOutcome::FastForward(id) => serializer.serialize_str(id.as_str()),
            MergeOutcome::Merged => serializer.serialize_bool(true),
        }
    }
}

impl std::fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeOutcome::AlreadyMerged => f.write_str("false"),
            MergeOutcome::FastForward(id) => write!(f, "{id}"),
            MergeOutcome::Merged => f.write_str("true"),
        }
    }
}

impl Repo {
    /// Classify `target` against the primary branch tip without touching
    /// the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefLookup`] if `target` or the primary branch does not resolve
    /// - [`GitError::MergeBase`] if the commits share no history
    pub fn classify_merge(&self, target: &str) -> Result<MergeClass, GitError> {
        let (base, target_id, tip) = self.merge_inputs(target)?;
        Ok(classify(&base, &target_id, &tip))
    }

    /// Merge `target` into the current branch.
    ///
    /// Already-merged and fast-forward targets leave the repository
    /// untouched. Otherwise a true merge writes the result into the index
    /// and working tree and leaves the repository in merge state for a
    /// following [`Repo::commit`].
    ///
    /// # Errors
    ///
    /// - [`GitError::RefLookup`] if `target` or the primary branch does not resolve
    /// - [`GitError::MergeBase`] if no merge base exists
    /// - [`GitError::AnnotatedCommit`] / [`GitError::Merge`] on libgit2 failure
    /// - [`GitError::MergeConflict`] if the merge left conflicts; the
    ///   conflicted index and merge state are kept
    pub fn merge(&self, target: &str) -> Result<MergeOutcome, GitError> {
        let (base, target_id, tip) = self.merge_inputs(target)?;

        match classify(&base, &target_id, &tip) {
            MergeClass::AlreadyMerged => {
                debug!(target, "already merged");
                return Ok(MergeOutcome::AlreadyMerged);
            }
            MergeClass::FastForward => {
                debug!(target, id = %target_id, "fast-forward possible");
                return Ok(MergeOutcome::FastForward(Oid::from_git2(target_id)));
            }
            MergeClass::MergeRequired => {}
        }

        let repo = self.raw();
        let annotated = repo
            .find_annotated_commit(target_id)
            .map_err(|e| GitError::AnnotatedCommit {
                message: e.message().to_string(),
            })?;
        repo.merge(&[&annotated], None, None)
            .map_err(|e| GitError::Merge {
                message: e.message().to_string(),
            })?;

        let index = repo.index().map_err(|e| GitError::Index {
            message: e.message().to_string(),
        })?;
        if index.has_conflicts() {
            warn!(target, "merge left conflicts");
            return Err(GitError::MergeConflict);
        }

        info!(target, id = %target_id, "merged");
        Ok(MergeOutcome::Merged)
    }

    /// Merge base, target id and primary tip, in that order.
    fn merge_inputs(&self, target: &str) -> Result<(git2::Oid, git2::Oid, git2::Oid), GitError> {
        let target_id = self.resolve_id(target)?;
        let tip = self.resolve_id(&self.primary_branch().ref_name())?;
        let base = self
            .raw()
            .merge_base(target_id, tip)
            .map_err(|e| GitError::MergeBase {
                message: e.message().to_string(),
            })?;
        Ok((base, target_id, tip))
    }
}
