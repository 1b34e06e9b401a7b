//! The diffing contract
//!
//! A [`Diffing`] value describes, for one artifact format, how to serialize
//! an artifact to storable bytes, how to restore it, and how to compare two
//! artifacts. It is a stateless, reusable value: constructing one never does
//! work, and every operation is a pure function of its inputs.

use crate::attachment::Attachment;
use std::fmt;
use std::sync::Arc;

/// Comparison contract for one artifact format
///
/// # Contract
/// - `from_bytes(to_bytes(a))` must be comparison-equivalent to `a`:
///   writing, reading back, and diffing against the original reports
///   equality for the same logical content. Byte-for-byte identity is
///   not required.
/// - `diff` may be approximate (e.g. pixel tolerance); exactness is
///   strategy-defined, not mandated here.
///
/// Cloning is cheap; the behavior is shared behind [`Arc`]s.
pub struct Diffing<Format> {
    to_bytes: Arc<dyn Fn(&Format) -> Vec<u8> + Send + Sync>,
    from_bytes: Arc<dyn Fn(&[u8]) -> Result<Format, DiffingError> + Send + Sync>,
    diff: Arc<dyn Fn(&Format, &Format) -> Option<Divergence> + Send + Sync>,
}

impl<Format> Diffing<Format> {
    /// Create a contract from its three operations
    pub fn new(
        to_bytes: impl Fn(&Format) -> Vec<u8> + Send + Sync + 'static,
        from_bytes: impl Fn(&[u8]) -> Result<Format, DiffingError> + Send + Sync + 'static,
        diff: impl Fn(&Format, &Format) -> Option<Divergence> + Send + Sync + 'static,
    ) -> Self {
        Self {
            to_bytes: Arc::new(to_bytes),
            from_bytes: Arc::new(from_bytes),
            diff: Arc::new(diff),
        }
    }

    /// Create an exact-equality contract
    ///
    /// Compares with `PartialEq`; on mismatch the divergence message is
    /// produced by `describe`.
    pub fn exact(
        to_bytes: impl Fn(&Format) -> Vec<u8> + Send + Sync + 'static,
        from_bytes: impl Fn(&[u8]) -> Result<Format, DiffingError> + Send + Sync + 'static,
        describe: impl Fn(&Format, &Format) -> String + Send + Sync + 'static,
    ) -> Self
    where
        Format: PartialEq,
    {
        Self::new(to_bytes, from_bytes, move |reference, fresh| {
            if reference == fresh {
                None
            } else {
                Some(Divergence::new(describe(reference, fresh)))
            }
        })
    }

    /// Serialize an artifact to storable bytes
    #[inline]
    #[must_use]
    pub fn to_bytes(&self, artifact: &Format) -> Vec<u8> {
        (self.to_bytes)(artifact)
    }

    /// Restore an artifact from stored bytes
    ///
    /// # Errors
    /// Returns [`DiffingError`] if the bytes cannot be decoded as this format
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Format, DiffingError> {
        (self.from_bytes)(bytes)
    }

    /// Compare two artifacts
    ///
    /// Returns `None` when the artifacts are equal under this contract's
    /// comparison semantics, or a [`Divergence`] describing the mismatch.
    #[inline]
    #[must_use]
    pub fn diff(&self, reference: &Format, fresh: &Format) -> Option<Divergence> {
        (self.diff)(reference, fresh)
    }
}

impl<Format> Clone for Diffing<Format> {
    fn clone(&self) -> Self {
        Self {
            to_bytes: Arc::clone(&self.to_bytes),
            from_bytes: Arc::clone(&self.from_bytes),
            diff: Arc::clone(&self.diff),
        }
    }
}

impl<Format> fmt::Debug for Diffing<Format> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diffing")
            .field("format", &std::any::type_name::<Format>())
            .finish_non_exhaustive()
    }
}

/// Mismatch report produced by [`Diffing::diff`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Human-readable description of the mismatch
    message: String,
    /// Auxiliary material for richer reporting
    attachments: Vec<Attachment>,
}

impl Divergence {
    /// Create a divergence with a message and no attachments
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attachments: Vec::new(),
        }
    }

    /// Add an attachment
    #[inline]
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// The mismatch description
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attached auxiliary bytes
    #[inline]
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Consume into message and attachments
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<Attachment>) {
        (self.message, self.attachments)
    }
}

/// Errors raised by the diffing contract
#[derive(Debug, thiserror::Error)]
pub enum DiffingError {
    /// Stored bytes could not be decoded as the expected format
    #[error("reference bytes could not be decoded: {0}")]
    Decode(String),

    /// Stored bytes were not valid UTF-8 for a textual format
    #[error("reference bytes are not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}
