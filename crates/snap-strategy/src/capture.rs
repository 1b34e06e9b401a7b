//! Blocking settlement of asynchronous captures
//!
//! The calling thread performs one bounded wait per snapshot: [`settle`]
//! starts the capture and blocks on a one-shot channel until the
//! completion fires or the deadline elapses. This is the single
//! synchronization point in the engine.

use crate::async_value::{Async, Completion};
use crossbeam::channel::{bounded, RecvTimeoutError};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Terminal failure of a capture
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The completion did not fire within the deadline
    #[error(
        "snapshot capture timed out after {timeout:?} — asynchronous work \
         (e.g. rendering) may not have completed; consider raising the timeout"
    )]
    TimedOut {
        /// The deadline that elapsed
        timeout: Duration,
    },

    /// The capture returned and dropped its handle without firing
    #[error("snapshot capture finished without signaling completion")]
    NeverSignaled,

    /// The completion fired more than once
    #[error("snapshot capture signaled completion more than once")]
    DoubleSignaled,

    /// The capture function panicked
    #[error("snapshot capture panicked: {0}")]
    Panicked(String),
}

impl CaptureError {
    /// Check whether this failure is the timeout class
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Materialize an asynchronous capture, waiting at most `timeout`
///
/// The capture runs on the calling thread; if it hands its completion to
/// background work, the calling thread blocks until the completion fires
/// or the deadline elapses. A completion that fires after a timeout is
/// ignored — its value is dropped, never delivered.
///
/// # Errors
/// - [`CaptureError::TimedOut`] if nothing fired within `timeout`
/// - [`CaptureError::NeverSignaled`] if every completion handle was
///   dropped without firing
/// - [`CaptureError::DoubleSignaled`] if the completion fired more than
///   once before settlement
/// - [`CaptureError::Panicked`] if the capture function panicked on the
///   calling thread
pub fn settle<T: Send + 'static>(work: Async<T>, timeout: Duration) -> Result<T, CaptureError> {
    let (tx, rx) = bounded::<T>(1);
    let done = Completion::root(move |value| {
        // Receiver may be gone after a timeout; the late value is dropped.
        let _ = tx.send(value);
    });
    let violated = done.violation_flag();

    catch_unwind(AssertUnwindSafe(|| work.run(done)))
        .map_err(|payload| CaptureError::Panicked(panic_message(payload.as_ref())))?;

    match rx.recv_timeout(timeout) {
        Ok(value) => {
            if violated.load(Ordering::SeqCst) {
                Err(CaptureError::DoubleSignaled)
            } else {
                Ok(value)
            }
        }
        Err(RecvTimeoutError::Timeout) => Err(CaptureError::TimedOut { timeout }),
        Err(RecvTimeoutError::Disconnected) => Err(CaptureError::NeverSignaled),
    }
}

/// Extract a readable message from a panic payload
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
