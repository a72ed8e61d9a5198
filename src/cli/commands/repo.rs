//! Repository commands - init, remote, branch, reset, commit, lookup, add

use anyhow::{Context as _, Result};

use crate::cli::{Access, Context};
use crate::core::types::ResetMode;
use crate::git::{Repo, RepoOptions};
use crate::ui::output;

/// Create a repository in the working directory.
pub fn init(ctx: &Context) -> Result<()> {
    let path = ctx.repo_path()?;
    let config = crate::core::config::Config::load(Some(&path))?.config;
    let options = RepoOptions::default().with_primary_branch(config.primary_branch_name()?);

    let repo = Repo::init(&path, options)
        .with_context(|| format!("Failed to initialize repository at {}", path.display()))?;

    output::print(
        format!("Initialized repository in {}", repo.path().display()),
        ctx.verbosity,
    );
    Ok(())
}

/// Show remote `name`, adding it with `url` when missing.
pub fn remote(ctx: &Context, name: &str, url: Option<&str>) -> Result<()> {
    let session = ctx.session(Access::Local)?;
    let remote = session.repo.remote(name, url)?;

    if ctx.json {
        let value = serde_json::json!({ "name": remote.name(), "url": remote.url() });
        println!("{}", value);
    } else {
        println!("{}\t{}", remote.name(), remote.url().unwrap_or(""));
    }
    Ok(())
}

/// Create branch `name` at `base`; prints whether it was created.
pub fn branch(ctx: &Context, name: &str, base: &str) -> Result<()> {
    let session = ctx.session(Access::Local)?;
    let created = session.repo.branch(name, base)?;
    if !created {
        output::warn(format!("branch '{}' already exists", name), ctx.verbosity);
    }
    output::value(&created, ctx.json)
}

/// Reset HEAD to `commit`.
pub fn reset(ctx: &Context, commit: &str, mode: ResetMode) -> Result<()> {
    let session = ctx.session(Access::Local)?;
    session.repo.reset(commit, mode)?;
    output::print(format!("HEAD is now at {} ({})", commit, mode), ctx.verbosity);
    Ok(())
}

/// Commit the index; prints the new id.
pub fn commit(ctx: &Context, message: &str) -> Result<()> {
    let session = ctx.session(Access::Local)?;
    let id = session.repo.commit(message)?;
    output::value(&id, ctx.json)
}

/// Resolve `name`; prints the id.
pub fn lookup(ctx: &Context, name: &str) -> Result<()> {
    let session = ctx.session(Access::Local)?;
    let id = session.repo.lookup(name)?;
    output::value(&id, ctx.json)
}

/// Stage `path`; prints the staged paths.
pub fn add(ctx: &Context, path: &str) -> Result<()> {
    let session = ctx.session(Access::Local)?;
    let staged = session.repo.add(path)?;

    if ctx.json {
        println!("{}", serde_json::to_string(&staged)?);
    } else if staged.is_empty() {
        output::print(format!("{}: no changes", path), ctx.verbosity);
    } else {
        println!("{}", output::format_list(&staged, ""));
    }
    Ok(())
}
