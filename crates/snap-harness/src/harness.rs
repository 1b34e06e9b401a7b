//! The snapshot lifecycle orchestrator
//!
//! The top-level entry point: resolves the reference path, runs the
//! capture under a timeout, then either records the fresh artifact or
//! verifies it against the stored baseline. Every error class is caught
//! at this boundary and converted into a single reported-failure channel
//! attributed to the caller's source location — a failing snapshot never
//! crashes the process from inside the engine.

use crate::counter;
use crate::error::SnapshotError;
use crate::identity::SnapshotIdentity;
use snap_diffing::Attachment;
use snap_strategy::{panic_message, settle, CaptureError, Snapshotting};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Duration;

/// Default bound on the asynchronous capture wait
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// What to do with the freshly captured artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Write the artifact unconditionally, overwriting any baseline
    Record,
    /// Compare against the stored baseline and fail on mismatch
    #[default]
    Verify,
}

/// Configuration surface for one snapshot invocation
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    name: Option<String>,
    directory: Option<PathBuf>,
    timeout: Duration,
    mode: Mode,
    sequence: Option<u32>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            name: None,
            directory: None,
            timeout: DEFAULT_TIMEOUT,
            mode: Mode::default(),
            sequence: None,
        }
    }
}

impl SnapshotConfig {
    /// Default configuration: verify mode, 5 second timeout
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit snapshot name instead of test-name derivation
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the snapshot directory
    #[inline]
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Bound the asynchronous capture wait
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Select record or verify mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Pin the sequence number instead of using the global registry
    #[inline]
    #[must_use]
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Selected mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Caller location threaded explicitly from the call site
///
/// Used for default name derivation and failure attribution only; once
/// explicit name and directory overrides are given it plays no part in
/// the snapshot's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Source file of the calling test
    pub file: &'static str,
    /// Line of the snapshot call
    pub line: u32,
    /// Name of the calling test function
    pub function: &'static str,
}

impl CallSite {
    /// Create a call site record
    #[inline]
    #[must_use]
    pub fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.function)
    }
}

/// A reported snapshot failure, attributed to the calling test
#[derive(Debug, Clone)]
pub struct Failure {
    message: String,
    call_site: CallSite,
    attachments: Vec<Attachment>,
}

impl Failure {
    fn new(message: impl Into<String>, call_site: CallSite) -> Self {
        Self {
            message: message.into(),
            call_site,
            attachments: Vec::new(),
        }
    }

    fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// The failure description
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the failing snapshot call originated
    #[inline]
    #[must_use]
    pub fn call_site(&self) -> CallSite {
        self.call_site
    }

    /// Auxiliary material attached by the diffing contract
    #[inline]
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.call_site, self.message)
    }
}

/// Run the snapshot lifecycle for one value
///
/// Resolves the reference path from the call site and configuration,
/// constructs the value lazily, captures it through the strategy under
/// the configured timeout, and then records or verifies per
/// [`SnapshotConfig::mode`].
///
/// Returns `None` on success. Every failure class — construction panic,
/// capture timeout or protocol violation, decode failure, filesystem
/// error, mismatch — is returned as a [`Failure`] attributed to
/// `call_site`, never propagated as a panic.
///
/// In record mode, exactly one of {artifact written, failure returned}
/// occurs per call. In verify mode a missing baseline records the fresh
/// artifact and still reports a failure, so a first run is never a
/// silent pass.
pub fn verify_snapshot<Value, Format>(
    value: impl FnOnce() -> Value,
    strategy: &Snapshotting<Value, Format>,
    config: &SnapshotConfig,
    call_site: CallSite,
) -> Option<Failure>
where
    Value: Send + 'static,
    Format: Send + 'static,
{
    match run_lifecycle(value, strategy, config, call_site) {
        Ok(verdict) => verdict,
        Err(err) => Some(Failure::new(err.to_string(), call_site)),
    }
}

fn run_lifecycle<Value, Format>(
    value: impl FnOnce() -> Value,
    strategy: &Snapshotting<Value, Format>,
    config: &SnapshotConfig,
    call_site: CallSite,
) -> Result<Option<Failure>, SnapshotError>
where
    Value: Send + 'static,
    Format: Send + 'static,
{
    let source_file = PathBuf::from(call_site.file);
    let sequence = config.sequence.unwrap_or_else(|| {
        counter::global().next_sequence(&source_file, call_site.function)
    });

    let identity = SnapshotIdentity::new(source_file, call_site.function)
        .with_name(config.name.as_deref())
        .with_sequence(sequence)
        .with_extension(strategy.path_extension())
        .with_directory(config.directory.clone());

    let directory = identity.snapshot_directory();
    let path = identity.resolve();
    tracing::debug!(path = %path.display(), mode = ?config.mode, "resolved snapshot path");

    // Idempotent and race-safe against sibling invocations.
    std::fs::create_dir_all(&directory)
        .map_err(|err| SnapshotError::io(&directory, err))?;

    let value = catch_unwind(AssertUnwindSafe(value))
        .map_err(|payload| SnapshotError::Construction(panic_message(payload.as_ref())))?;

    // A capture closure may panic before handing back its deferred work;
    // contain that here the same way settle contains the deferred stage.
    let work = catch_unwind(AssertUnwindSafe(|| strategy.capture(value))).map_err(|payload| {
        SnapshotError::Capture(CaptureError::Panicked(panic_message(payload.as_ref())))
    })?;

    let artifact = settle(work, config.timeout)?;

    match config.mode {
        Mode::Record => {
            write_artifact(&path, &strategy.diffing().to_bytes(&artifact))?;
            tracing::info!(path = %path.display(), "recorded snapshot");
            Ok(None)
        }
        Mode::Verify => {
            if !path.exists() {
                write_artifact(&path, &strategy.diffing().to_bytes(&artifact))?;
                tracing::info!(path = %path.display(), "recorded missing baseline");
                return Ok(Some(Failure::new(
                    format!(
                        "no reference snapshot found at {}; recorded the captured \
                         artifact — re-run the test to verify against it",
                        path.display()
                    ),
                    call_site,
                )));
            }

            let stored = std::fs::read(&path).map_err(|err| SnapshotError::io(&path, err))?;
            let reference = strategy.diffing().from_bytes(&stored)?;

            match strategy.diffing().diff(&reference, &artifact) {
                None => Ok(None),
                Some(divergence) => {
                    let (message, attachments) = divergence.into_parts();
                    Ok(Some(
                        Failure::new(
                            format!("snapshot mismatch against {}: {message}", path.display()),
                            call_site,
                        )
                        .with_attachments(attachments),
                    ))
                }
            }
        }
    }
}

fn write_artifact(path: &std::path::Path, bytes: &[u8]) -> Result<(), SnapshotError> {
    std::fs::write(path, bytes).map_err(|err| SnapshotError::io(path, err))
}
