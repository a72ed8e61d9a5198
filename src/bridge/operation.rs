//! bridge::operation
//!
//! Shared completion state of one in-flight operation.
//!
//! The worker side writes the error buffer and then flips the completion
//! flag exactly once. The consuming side only reads the buffer after it has
//! observed the flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::task::Waker;

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced when consuming an operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The worker reported a failure.
    #[error("git remote operation error: {message}")]
    Failed {
        /// What was running, e.g. `fetch origin`
        label: String,
        /// Error text captured by the worker
        message: String,
    },

    /// The terminal result was already taken by an earlier poll.
    #[error("operation '{label}' was already consumed")]
    AlreadyConsumed {
        /// What was running
        label: String,
    },

    /// The worker thread could not be joined.
    #[error("worker thread for '{label}' panicked")]
    WorkerPanicked {
        /// What was running
        label: String,
    },
}

/// Completion flag plus error buffer for one operation.
#[derive(Debug)]
pub struct Operation {
    id: Uuid,
    label: String,
    complete: AtomicBool,
    error: Mutex<Option<String>>,
    finished: Condvar,
    waker: Mutex<Option<Waker>>,
}

impl Operation {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            complete: AtomicBool::new(false),
            error: Mutex::new(None),
            finished: Condvar::new(),
            waker: Mutex::new(None),
        }
    }

    /// Unique id used to correlate log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Human-readable description (`fetch origin`, `push origin master`).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the worker has finished.
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// Error text left by the worker.
    ///
    /// Always `None` until [`is_complete`](Self::is_complete) returns true.
    pub fn error_message(&self) -> Option<String> {
        if !self.is_complete() {
            return None;
        }
        lock(&self.error).clone()
    }

    /// Record the worker's result and flip the completion flag.
    ///
    /// Must be called once, after the worker released every handle it opened.
    pub(crate) fn finish(&self, result: Result<(), String>) {
        {
            let mut error = lock(&self.error);
            debug_assert!(!self.is_complete(), "operation finished twice");
            *error = result.err();
            self.complete.store(true, Ordering::Release);
        }
        self.finished.notify_all();

        if let Some(waker) = lock(&self.waker).take() {
            waker.wake();
        }
    }

    /// Block until the worker has finished.
    pub(crate) fn wait(&self) {
        let mut guard = lock(&self.error);
        while !self.is_complete() {
            guard = self
                .finished
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Remember who to wake on completion.
    pub(crate) fn register_waker(&self, waker: &Waker) {
        let mut slot = lock(&self.waker);
        match slot.as_ref() {
            Some(existing) if existing.will_wake(waker) => {}
            _ => *slot = Some(waker.clone()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
