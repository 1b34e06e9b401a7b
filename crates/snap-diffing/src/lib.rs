//! SNAP Diffing Contract
//!
//! Defines how a serialized snapshot artifact is converted to and from
//! storable bytes, and how two artifacts of the same format are compared.
//!
//! # Core Concepts
//!
//! - [`Diffing<Format>`]: the pluggable comparison contract for one format
//! - [`Divergence`]: a human-readable mismatch report with attachments
//! - [`Attachment`]: named auxiliary bytes carried alongside a failure
//!
//! # Example
//!
//! ```rust
//! use snap_diffing::Diffing;
//!
//! let diffing = Diffing::<String>::lines();
//! let bytes = diffing.to_bytes(&"hello".to_string());
//! let restored = diffing.from_bytes(&bytes).unwrap();
//! assert!(diffing.diff(&restored, &"hello".to_string()).is_none());
//! ```

mod attachment;
mod diffing;
mod text;

pub use attachment::Attachment;
pub use diffing::{Diffing, DiffingError, Divergence};
pub use text::render_line_diff;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
