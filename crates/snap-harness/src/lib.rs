//! SNAP Harness
//!
//! The snapshot lifecycle orchestrator: derives the on-disk reference
//! path for a test, captures the value through its strategy under a
//! bounded wait, and records or verifies the serialized artifact.
//!
//! # Core Concepts
//!
//! - [`verify_snapshot`]: the single entry point for one snapshot call
//! - [`SnapshotConfig`] / [`Mode`]: record vs. verify, names, timeouts
//! - [`SnapshotIdentity`]: deterministic path derivation
//! - [`Failure`]: a reported failure attributed to the calling test
//!
//! # Example
//!
//! ```rust,no_run
//! use snap_harness::{verify_snapshot, CallSite, Mode, SnapshotConfig};
//! use snap_strategy::strategies;
//!
//! let config = SnapshotConfig::new()
//!     .with_directory("/tmp/snaps")
//!     .with_name("greeting")
//!     .with_mode(Mode::Record);
//! let failure = verify_snapshot(
//!     || "hello".to_string(),
//!     &strategies::lines(),
//!     &config,
//!     CallSite::new(file!(), line!(), "testGreeting"),
//! );
//! assert!(failure.is_none());
//! ```

mod counter;
mod error;
mod harness;
mod identity;

pub use counter::{global as global_counters, CounterRegistry};
pub use error::SnapshotError;
pub use harness::{
    verify_snapshot, CallSite, Failure, Mode, SnapshotConfig, DEFAULT_TIMEOUT,
};
pub use identity::{
    sanitize_path_component, strip_test_prefix, SnapshotIdentity, SNAPSHOT_DIR_NAME,
};

// Re-exported so failure consumers need not depend on snap-diffing directly.
pub use snap_diffing::Attachment;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Assert a snapshot from inside a test function, panicking on failure
///
/// Thin wrapper over [`verify_snapshot`] that fills the call site from
/// `file!()`/`line!()` and the supplied test name, and panics with the
/// failure message so the host test framework reports it at the right
/// test.
#[macro_export]
macro_rules! assert_snapshot {
    ($value:expr, $strategy:expr, $test_name:expr) => {
        $crate::assert_snapshot!($value, $strategy, $test_name, $crate::SnapshotConfig::new());
    };
    ($value:expr, $strategy:expr, $test_name:expr, $config:expr) => {
        if let Some(failure) = $crate::verify_snapshot(
            || $value,
            $strategy,
            &$config,
            $crate::CallSite::new(file!(), line!(), $test_name),
        ) {
            panic!("{failure}");
        }
    };
}
