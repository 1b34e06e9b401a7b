//! One-shot deferred values
//!
//! A capture function may finish synchronously or hand its completion
//! handle to background work (a render pass, a timer). [`Async<T>`] wraps
//! that protocol: running it passes a [`Completion<T>`] to the capture,
//! and the capture fires the handle exactly once when the value is ready.
//!
//! The fire-at-most-once rule is enforced with an atomic flag shared down
//! composition chains: a second fire is dropped and recorded as a protocol
//! violation rather than corrupting the delivered value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot completion handle
///
/// Cloneable so a capture can move it into a background thread. All
/// clones (and all handles derived through [`Async::map`]/[`Async::then`])
/// share one fire budget: the first [`complete`](Self::complete) wins,
/// later calls are ignored and flagged.
pub struct Completion<T> {
    deliver: Arc<dyn Fn(T) + Send + Sync>,
    fired: Arc<AtomicBool>,
    violated: Arc<AtomicBool>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            deliver: Arc::clone(&self.deliver),
            fired: Arc::clone(&self.fired),
            violated: Arc::clone(&self.violated),
        }
    }
}

impl<T> std::fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("fired", &self.fired.load(Ordering::SeqCst))
            .field("violated", &self.violated.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<T> Completion<T> {
    /// Create a root completion delivering into `deliver`
    pub(crate) fn root(deliver: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Arc::new(deliver),
            fired: Arc::new(AtomicBool::new(false)),
            violated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a completion sharing another chain's violation flag
    ///
    /// Used by combinators so that a misfire anywhere in a composed
    /// capture surfaces on the root handle's flag. `fired` stays fresh:
    /// each staged handle has its own single delivery.
    pub(crate) fn chained(
        violated: Arc<AtomicBool>,
        deliver: impl Fn(T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            deliver: Arc::new(deliver),
            fired: Arc::new(AtomicBool::new(false)),
            violated,
        }
    }

    /// Fire the completion with the materialized value
    ///
    /// The first call delivers; any later call is dropped, recorded as a
    /// protocol violation, and logged.
    pub fn complete(&self, value: T) {
        if self.fired.swap(true, Ordering::SeqCst) {
            self.violated.store(true, Ordering::SeqCst);
            tracing::warn!("completion fired more than once; extra value ignored");
            return;
        }
        (self.deliver)(value);
    }

    /// Shared violation flag for this completion chain
    pub(crate) fn violation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.violated)
    }

    /// Derive a handle accepting `U` by mapping into this handle's `T`
    ///
    /// Delivery goes through `self.complete`, so both guards participate
    /// and the violation flag is shared.
    pub(crate) fn contramap<U>(&self, f: impl Fn(U) -> T + Send + Sync + 'static) -> Completion<U>
    where
        T: 'static,
    {
        let outer = self.clone();
        Completion::chained(self.violation_flag(), move |value| {
            outer.complete(f(value));
        })
    }
}

/// A value that arrives now or later, exactly once
///
/// Wraps a capture function that receives a [`Completion<T>`] and fires it
/// when the value is ready — possibly synchronously before returning,
/// possibly from another thread afterwards.
pub struct Async<T> {
    run: Box<dyn FnOnce(Completion<T>) + Send>,
}

impl<T> std::fmt::Debug for Async<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Async")
            .field("value", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Async<T> {
    /// Wrap a capture function
    pub fn new(run: impl FnOnce(Completion<T>) + Send + 'static) -> Self {
        Self { run: Box::new(run) }
    }

    /// A value that is already available
    pub fn immediate(value: T) -> Self {
        Self::new(move |done| done.complete(value))
    }

    /// Start the capture, handing it the completion handle
    pub fn run(self, done: Completion<T>) {
        (self.run)(done);
    }

    /// Transform the delivered value
    pub fn map<U: Send + 'static>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Async<U> {
        Async::new(move |done: Completion<U>| self.run(done.contramap(f)))
    }

    /// Chain a second asynchronous stage onto the delivered value
    ///
    /// The resulting capture completes only when both stages have fired.
    pub fn then<U: Send + 'static>(
        self,
        f: impl Fn(T) -> Async<U> + Send + Sync + 'static,
    ) -> Async<U> {
        Async::new(move |done: Completion<U>| {
            let next = done.clone();
            let bridge = Completion::chained(done.violation_flag(), move |value| {
                f(value).run(next.clone());
            });
            self.run(bridge);
        })
    }
}
