//! bridge::pending
//!
//! Caller-side handle for a submitted operation.
//!
//! A [`PendingOperation`] can be driven three ways:
//!
//! - [`check`](PendingOperation::check): one non-blocking look at the flag,
//!   for hosts that re-arm their own timer;
//! - [`poll_until_complete`](PendingOperation::poll_until_complete): the
//!   fixed-interval loop, with the host's suspension supplied as a closure;
//! - `.await` or [`wait`](PendingOperation::wait): woken by the worker, no
//!   polling latency.
//!
//! Whichever path observes completion first consumes the result. Every later
//! attempt fails with [`OperationError::AlreadyConsumed`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use super::operation::{Operation, OperationError};

/// Handle to an operation that may still be running.
#[derive(Debug)]
pub struct PendingOperation {
    operation: Arc<Operation>,
    worker: Option<JoinHandle<()>>,
    consumed: bool,
}

impl PendingOperation {
    pub(crate) fn new(operation: Arc<Operation>, worker: Option<JoinHandle<()>>) -> Self {
        Self {
            operation,
            worker,
            consumed: false,
        }
    }

    /// The shared operation state.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Whether the terminal result has already been taken.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Look at the completion flag once without blocking.
    ///
    /// Returns `None` while the worker is still running. The first call
    /// after completion returns the terminal result; calls after that
    /// return `Some(Err(AlreadyConsumed))`.
    pub fn check(&mut self) -> Option<Result<(), OperationError>> {
        if self.consumed {
            return Some(Err(OperationError::AlreadyConsumed {
                label: self.operation.label().to_string(),
            }));
        }
        if !self.operation.is_complete() {
            return None;
        }
        Some(self.consume())
    }

    /// Re-check at a fixed interval until the operation completes.
    ///
    /// `suspend` is called between checks with `interval`; a host scheduler
    /// yields there, a plain thread sleeps.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gitbridge::bridge::{work, ExecutionMode, DEFAULT_POLL_INTERVAL};
    ///
    /// let runner = ExecutionMode::Background.runner();
    /// let mut pending = runner.submit("demo", work(|| Ok(())));
    /// pending.poll_until_complete(DEFAULT_POLL_INTERVAL, std::thread::sleep)?;
    /// # Ok::<(), gitbridge::bridge::OperationError>(())
    /// ```
    pub fn poll_until_complete(
        &mut self,
        interval: Duration,
        mut suspend: impl FnMut(Duration),
    ) -> Result<(), OperationError> {
        loop {
            if let Some(result) = self.check() {
                return result;
            }
            suspend(interval);
        }
    }

    /// Block the calling thread until the worker signals completion.
    pub fn wait(&mut self) -> Result<(), OperationError> {
        if !self.consumed {
            self.operation.wait();
        }
        self.check().unwrap_or_else(|| {
            // wait() only returns once the flag is set
            Err(OperationError::WorkerPanicked {
                label: self.operation.label().to_string(),
            })
        })
    }

    fn consume(&mut self) -> Result<(), OperationError> {
        self.consumed = true;
        let label = self.operation.label().to_string();

        // Completion is the worker's last step, but its thread may still be
        // tearing down. Never block here since `poll` runs on an executor;
        // an unfinished handle is dropped, which detaches the thread.
        if let Some(worker) = self.worker.take() {
            if worker.is_finished() && worker.join().is_err() {
                return Err(OperationError::WorkerPanicked { label });
            }
        }

        debug!(op = %self.operation.id(), %label, "operation consumed");
        match self.operation.error_message() {
            None => Ok(()),
            Some(message) => Err(OperationError::Failed { label, message }),
        }
    }
}

impl Future for PendingOperation {
    type Output = Result<(), OperationError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(result) = this.check() {
            return Poll::Ready(result);
        }

        this.operation.register_waker(cx.waker());

        // The worker may have finished between the check and the registration.
        match this.check() {
            Some(result) => Poll::Ready(result),
            None => Poll::Pending,
        }
    }
}
