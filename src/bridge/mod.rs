//! bridge
//!
//! Runs long network operations off the caller's thread.
//!
//! # Architecture
//!
//! A fetch or push is submitted to a [`Runner`]. The runner either executes
//! it inline or hands it to a dedicated worker thread, and returns a
//! [`PendingOperation`]. The caller re-checks completion at a fixed interval
//! (suspending in between), blocks on [`PendingOperation::wait`], or awaits
//! the handle as a `Future`.
//!
//! # Invariants
//!
//! - Each operation is executed by exactly one worker.
//! - The worker records its error text, then sets the completion flag once,
//!   after every repository handle it opened has been dropped.
//! - Worker failures surface only at the check that observes completion,
//!   and exactly once; later checks report the operation as consumed.
//! - No cancellation: a submitted operation runs to success or failure.
//!
//! # Example
//!
//! ```
//! use gitbridge::bridge::{work, ExecutionMode, DEFAULT_POLL_INTERVAL};
//!
//! let runner = ExecutionMode::Background.runner();
//! let mut pending = runner.submit("example", work(|| Err("unreachable host".into())));
//!
//! let err = pending
//!     .poll_until_complete(DEFAULT_POLL_INTERVAL, std::thread::sleep)
//!     .unwrap_err();
//! assert!(err.to_string().contains("unreachable host"));
//! ```

mod operation;
mod pending;
mod runner;

use std::time::Duration;

pub use operation::{Operation, OperationError};
pub use pending::PendingOperation;
pub use runner::{work, ExecutionMode, InlineRunner, Runner, ThreadedRunner, Work};

/// Interval between completion checks in the fixed-delay poll loop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
