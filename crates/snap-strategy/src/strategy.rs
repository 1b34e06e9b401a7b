//! The snapshotting strategy
//!
//! A [`Snapshotting<Value, Format>`] bundles everything the lifecycle
//! engine needs for one kind of value: how to capture it into an artifact,
//! how to diff two artifacts, and which file extension the artifact is
//! stored under. Strategies are configuration: constructed once, immutable,
//! and composed via [`pullback`](Snapshotting::pullback) to adapt new value
//! types without touching the format side.

use crate::async_value::Async;
use snap_diffing::Diffing;
use std::fmt;
use std::sync::Arc;

/// Pluggable rule mapping a value to a comparable artifact
///
/// # Invariants
/// - `Format` is fixed per strategy instance
/// - The capture function must be idempotent given equal input: no hidden
///   shared mutable state between invocations
pub struct Snapshotting<Value, Format> {
    path_extension: Option<String>,
    diffing: Diffing<Format>,
    snapshot: Arc<dyn Fn(Value) -> Async<Format> + Send + Sync>,
}

impl<Value, Format> Clone for Snapshotting<Value, Format> {
    fn clone(&self) -> Self {
        Self {
            path_extension: self.path_extension.clone(),
            diffing: self.diffing.clone(),
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

impl<Value, Format> fmt::Debug for Snapshotting<Value, Format> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshotting")
            .field("value", &std::any::type_name::<Value>())
            .field("format", &std::any::type_name::<Format>())
            .field("path_extension", &self.path_extension)
            .finish_non_exhaustive()
    }
}

impl<Value, Format> Snapshotting<Value, Format>
where
    Value: Send + 'static,
    Format: Send + 'static,
{
    /// Create a strategy from an asynchronous capture function
    pub fn new(
        path_extension: Option<&str>,
        diffing: Diffing<Format>,
        snapshot: impl Fn(Value) -> Async<Format> + Send + Sync + 'static,
    ) -> Self {
        Self {
            path_extension: path_extension.map(str::to_string),
            diffing,
            snapshot: Arc::new(snapshot),
        }
    }

    /// Create a strategy whose capture completes synchronously
    pub fn sync(
        path_extension: Option<&str>,
        diffing: Diffing<Format>,
        capture: impl Fn(Value) -> Format + Send + Sync + 'static,
    ) -> Self {
        Self::new(path_extension, diffing, move |value| {
            Async::immediate(capture(value))
        })
    }

    /// Default file extension for stored artifacts, without the dot
    #[inline]
    #[must_use]
    pub fn path_extension(&self) -> Option<&str> {
        self.path_extension.as_deref()
    }

    /// The diffing contract for this strategy's format
    #[inline]
    #[must_use]
    pub fn diffing(&self) -> &Diffing<Format> {
        &self.diffing
    }

    /// Start capturing a value into an artifact
    #[inline]
    #[must_use]
    pub fn capture(&self, value: Value) -> Async<Format> {
        (self.snapshot)(value)
    }

    /// Replace the stored file extension
    #[inline]
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.path_extension = Some(extension.to_string());
        self
    }

    /// Adapt this strategy to a new value type via a synchronous transform
    ///
    /// The derived strategy applies `transform` first, then delegates
    /// capture and diffing to `self`. The format side is untouched, so an
    /// artifact strategy built once serves any type reducible to `Value`.
    #[must_use]
    pub fn pullback<New>(
        &self,
        transform: impl Fn(New) -> Value + Send + Sync + 'static,
    ) -> Snapshotting<New, Format>
    where
        New: Send + 'static,
    {
        let inner = Arc::clone(&self.snapshot);
        Snapshotting {
            path_extension: self.path_extension.clone(),
            diffing: self.diffing.clone(),
            snapshot: Arc::new(move |new| inner(transform(new))),
        }
    }

    /// Adapt via a transform that is itself asynchronous
    ///
    /// The derived capture chains both asynchronous stages and completes
    /// only when both have fired.
    #[must_use]
    pub fn async_pullback<New>(
        &self,
        transform: impl Fn(New) -> Async<Value> + Send + Sync + 'static,
    ) -> Snapshotting<New, Format>
    where
        New: Send + 'static,
    {
        let inner = Arc::clone(&self.snapshot);
        Snapshotting {
            path_extension: self.path_extension.clone(),
            diffing: self.diffing.clone(),
            snapshot: Arc::new(move |new| {
                let inner = Arc::clone(&inner);
                transform(new).then(move |value| inner(value))
            }),
        }
    }
}
