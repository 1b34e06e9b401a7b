//! Error taxonomy for the snapshot lifecycle
//!
//! Everything the orchestrator can hit — value construction panics,
//! capture timeouts and protocol violations, reference decode failures,
//! filesystem errors — funnels into [`SnapshotError`]. Nothing here is
//! ever allowed to escape as an unhandled crash; the orchestrator
//! converts every variant into a reported failure attributed to the
//! calling test.

use snap_diffing::DiffingError;
use snap_strategy::CaptureError;
use std::path::PathBuf;

/// Failure classes of one snapshot invocation
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Building the value to snapshot panicked
    #[error("value construction failed: {0}")]
    Construction(String),

    /// The capture stage failed (timeout, protocol violation, panic)
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// The stored reference could not be decoded
    #[error("reference artifact is unreadable: {0}")]
    Decode(#[from] DiffingError),

    /// Directory creation, read, or write failed
    #[error("filesystem operation failed at {path}: {source}")]
    Io {
        /// Path the operation targeted
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },
}

impl SnapshotError {
    /// Wrap a filesystem error with the path it targeted
    #[inline]
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check whether this is the capture-timeout class
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Capture(capture) if capture.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn construction_display() {
        let err = SnapshotError::Construction("boom".to_string());
        assert!(err.to_string().contains("value construction failed"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn capture_timeout_classification() {
        let err = SnapshotError::from(CaptureError::TimedOut {
            timeout: Duration::from_millis(100),
        });
        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out"));

        let err = SnapshotError::from(CaptureError::NeverSignaled);
        assert!(!err.is_timeout());
    }

    #[test]
    fn io_includes_path() {
        let err = SnapshotError::io(
            "/tmp/snaps/a.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/snaps/a.txt"));
    }
}
