//! fetch and push commands - Background transfers with a poll loop

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::bridge::PendingOperation;
use crate::cli::{Access, Context, Session};
use crate::ui::output;

/// Fetch `remote` (default: configured remote).
pub fn fetch(ctx: &Context, remote: Option<&str>) -> Result<()> {
    let session = ctx.session(Access::Network)?;
    let name = remote.unwrap_or_else(|| session.config.remote()).to_string();
    let handle = session
        .repo
        .remote(&name, None)
        .with_context(|| format!("Unknown remote '{}'", name))?;

    let runner = ctx.mode.runner();
    let pending = handle.fetch(runner.as_ref());
    finish(&session, pending)?;

    output::print(format!("Fetched {}", name), ctx.verbosity);
    Ok(())
}

/// Push `branch` to `remote` (default: configured remote).
pub fn push(ctx: &Context, branch: &str, remote: Option<&str>) -> Result<()> {
    let session = ctx.session(Access::Network)?;
    let name = remote.unwrap_or_else(|| session.config.remote()).to_string();
    let handle = session
        .repo
        .remote(&name, None)
        .with_context(|| format!("Unknown remote '{}'", name))?;

    let runner = ctx.mode.runner();
    let pending = handle.push(branch, runner.as_ref());
    finish(&session, pending)?;

    output::print(format!("Pushed {} to {}", branch, name), ctx.verbosity);
    Ok(())
}

/// Poll at the configured interval until the transfer completes.
fn finish(session: &Session, mut pending: PendingOperation) -> Result<()> {
    let mut polls = 0u64;
    let result = pending.poll_until_complete(session.poll_interval, |interval| {
        polls += 1;
        std::thread::sleep(interval);
    });
    debug!(op = %pending.operation().id(), polls, "transfer finished");
    Ok(result?)
}
