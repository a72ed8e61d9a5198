//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each handler opens a [`Session`](super::Session), calls one library
//! operation and prints its result. Fetch and push go through the bridge
//! and wait at a fixed poll interval.

mod merge;
mod repo;
mod transfer;

pub use merge::merge;
pub use repo::{add, branch, commit, init, lookup, remote, reset};
pub use transfer::{fetch, push};

use super::{Command, Context};
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init => init(ctx),
        Command::Remote { name, url } => remote(ctx, &name, url.as_deref()),
        Command::Fetch { remote } => fetch(ctx, remote.as_deref()),
        Command::Push { branch, remote } => push(ctx, &branch, remote.as_deref()),
        Command::Branch { name, base } => branch(ctx, &name, &base),
        Command::Reset { commit, mode } => reset(ctx, &commit, mode.into()),
        Command::Merge { commit } => merge(ctx, &commit),
        Command::Commit { message } => commit(ctx, &message),
        Command::Lookup { name } => lookup(ctx, &name),
        Command::Add { path } => add(ctx, &path),
    }
}
