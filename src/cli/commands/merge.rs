//! merge command - Merge a commit into the current branch

use anyhow::{Context as _, Result};

use crate::cli::{Access, Context};
use crate::git::{GitError, MergeOutcome};
use crate::ui::output;

/// Merge `target` and print the outcome.
///
/// Prints `false` when already merged, the target id when a fast-forward is
/// possible, and `true` after a true merge.
pub fn merge(ctx: &Context, target: &str) -> Result<()> {
    let session = ctx.session(Access::Local)?;

    let outcome = match session.repo.merge(target) {
        Ok(outcome) => outcome,
        Err(GitError::MergeConflict) => {
            output::warn(
                "conflicts left in the index; resolve and commit, or reset --mode hard",
                ctx.verbosity,
            );
            return Err(GitError::MergeConflict.into());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to merge {}", target)),
    };

    if let MergeOutcome::FastForward(_) = outcome {
        output::warn(
            format!("fast-forward possible; {} was not moved", session.repo.primary_branch()),
            ctx.verbosity,
        );
    }

    output::value(&outcome, ctx.json)
}
