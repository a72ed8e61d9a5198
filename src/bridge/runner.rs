//! bridge::runner
//!
//! Where submitted work executes.
//!
//! - [`InlineRunner`] runs the work on the calling thread; the returned
//!   handle is already complete. Use it when the caller cannot suspend.
//! - [`ThreadedRunner`] spawns one OS thread per submission and returns
//!   immediately.
//!
//! The caller picks one explicitly through [`ExecutionMode`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::operation::Operation;
use super::pending::PendingOperation;

/// A unit of work handed to a runner. `Err` carries the failure text.
pub type Work = Box<dyn FnOnce() -> Result<(), String> + Send + 'static>;

/// Box a closure as [`Work`].
pub fn work<F>(f: F) -> Work
where
    F: FnOnce() -> Result<(), String> + Send + 'static,
{
    Box::new(f)
}

/// Executes submitted work and hands back a [`PendingOperation`].
pub trait Runner: Send + Sync {
    /// Start `work` immediately.
    fn submit(&self, label: &str, work: Work) -> PendingOperation;

    /// Which mode this runner implements.
    fn mode(&self) -> ExecutionMode;
}

/// Selects a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Run on the calling thread.
    Inline,
    /// Run on a dedicated worker thread.
    #[default]
    Background,
}

impl ExecutionMode {
    /// Build the runner for this mode.
    pub fn runner(self) -> Box<dyn Runner> {
        match self {
            ExecutionMode::Inline => Box::new(InlineRunner),
            ExecutionMode::Background => Box::new(ThreadedRunner),
        }
    }
}

/// Runs work synchronously on the caller's thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineRunner;

impl Runner for InlineRunner {
    fn submit(&self, label: &str, work: Work) -> PendingOperation {
        let operation = Arc::new(Operation::new(label));
        debug!(op = %operation.id(), label, "running inline");
        execute(&operation, work);
        PendingOperation::new(operation, None)
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Inline
    }
}

/// Runs each submission on its own worker thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadedRunner;

impl Runner for ThreadedRunner {
    fn submit(&self, label: &str, work: Work) -> PendingOperation {
        let operation = Arc::new(Operation::new(label));
        let shared = Arc::clone(&operation);

        let spawned = thread::Builder::new()
            .name(format!("gitbridge-{}", operation.id().simple()))
            .spawn(move || execute(&shared, work));

        match spawned {
            Ok(handle) => {
                debug!(op = %operation.id(), label, "worker spawned");
                PendingOperation::new(operation, Some(handle))
            }
            Err(e) => {
                warn!(op = %operation.id(), label, error = %e, "failed to spawn worker");
                operation.finish(Err(format!("failed to spawn worker thread: {e}")));
                PendingOperation::new(operation, None)
            }
        }
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Background
    }
}

/// Run `work` and record its outcome. A panic counts as a failure so the
/// completion flag is always set.
fn execute(operation: &Operation, work: Work) {
    let result = match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(result) => result,
        Err(payload) => Err(format!("worker panicked: {}", panic_message(&*payload))),
    };

    match &result {
        Ok(()) => info!(op = %operation.id(), label = operation.label(), "operation succeeded"),
        Err(message) => {
            warn!(op = %operation.id(), label = operation.label(), error = %message, "operation failed")
        }
    }
    operation.finish(result);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::OperationError;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn inline_runner_completes_before_returning() {
        let mut pending = InlineRunner.submit("inline ok", work(|| Ok(())));
        assert!(pending.operation().is_complete());
        assert_eq!(pending.check(), Some(Ok(())));
    }

    #[test]
    fn inline_runner_captures_error() {
        let mut pending = InlineRunner.submit("inline err", work(|| Err("nope".into())));
        assert!(pending.operation().is_complete());
        assert_eq!(pending.operation().error_message().as_deref(), Some("nope"));
        assert!(matches!(
            pending.check(),
            Some(Err(OperationError::Failed { message, .. })) if message == "nope"
        ));
    }

    #[test]
    fn threaded_runner_returns_before_work_finishes() {
        let (release, gate) = mpsc::channel::<()>();
        let mut pending = ThreadedRunner.submit(
            "gated",
            work(move || {
                gate.recv().map_err(|e| e.to_string())?;
                Ok(())
            }),
        );

        assert_eq!(pending.check(), None);
        release.send(()).unwrap();
        assert_eq!(pending.wait(), Ok(()));
    }

    #[test]
    fn threaded_runner_surfaces_error_at_completion() {
        let mut pending = ThreadedRunner.submit("fails", work(|| Err("refused".into())));
        let result = pending.poll_until_complete(Duration::from_millis(5), thread::sleep);
        assert_eq!(
            result,
            Err(OperationError::Failed {
                label: "fails".into(),
                message: "refused".into()
            })
        );
    }

    #[test]
    fn panic_in_work_becomes_failure() {
        let mut pending = ThreadedRunner.submit("panics", work(|| panic!("kaboom")));
        match pending.wait() {
            Err(OperationError::Failed { message, .. }) => assert!(message.contains("kaboom")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn execution_mode_selects_runner() {
        assert_eq!(ExecutionMode::Inline.runner().mode(), ExecutionMode::Inline);
        assert_eq!(
            ExecutionMode::Background.runner().mode(),
            ExecutionMode::Background
        );
        assert_eq!(ExecutionMode::default(), ExecutionMode::Background);
    }
}
