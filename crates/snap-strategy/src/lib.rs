//! SNAP Strategy System
//!
//! Maps arbitrary values to comparable serialized artifacts.
//!
//! # Core Concepts
//!
//! - [`Snapshotting<Value, Format>`]: the pluggable capture strategy —
//!   a capture function, a diffing contract, and a file extension
//! - [`Async<T>`]: a one-shot deferred value produced by a capture
//! - [`Completion<T>`]: the at-most-once completion handle a capture fires
//! - [`settle`]: blocking wait that materializes an [`Async`] under a timeout
//!
//! # Example
//!
//! ```rust
//! use snap_strategy::{strategies, settle};
//! use std::time::Duration;
//!
//! let strategy = strategies::lines();
//! let artifact = settle(
//!     strategy.capture("hello".to_string()),
//!     Duration::from_secs(5),
//! )
//! .unwrap();
//! assert_eq!(artifact, "hello");
//! ```

mod async_value;
mod capture;
mod strategy;

pub mod strategies;

pub use async_value::{Async, Completion};
pub use capture::{panic_message, settle, CaptureError};
pub use strategy::Snapshotting;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
