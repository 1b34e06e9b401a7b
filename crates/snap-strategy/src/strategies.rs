//! Built-in strategies for common formats
//!
//! Small strategies the engine dogfoods in its own tests and that plain
//! data types can use directly. Heavyweight backends (image rendering,
//! UI views) live outside the core and plug in through the same
//! [`Snapshotting`] surface.

use crate::async_value::Async;
use crate::strategy::Snapshotting;
use serde::Serialize;
use snap_diffing::{Diffing, DiffingError, Divergence};

/// Strategy for UTF-8 text, stored as `.txt` and diffed line by line
#[must_use]
pub fn lines() -> Snapshotting<String, String> {
    Snapshotting::sync(Some("txt"), Diffing::lines(), |value| value)
}

/// Strategy for any [`Serialize`] value, stored as pretty-printed `.json`
///
/// Serialization runs inside the capture, so a failure (e.g. a map with
/// non-string keys) is reported as a contained capture failure, never a
/// process crash.
#[must_use]
pub fn json<V: Serialize + Send + 'static>() -> Snapshotting<V, String> {
    Snapshotting::new(Some("json"), Diffing::lines(), |value: V| {
        Async::new(move |done| match serde_json::to_string_pretty(&value) {
            Ok(text) => done.complete(text),
            Err(err) => panic!("JSON serialization failed: {err}"),
        })
    })
}

/// Strategy for raw bytes, stored as `.bin` and compared exactly
#[must_use]
pub fn bytes() -> Snapshotting<Vec<u8>, Vec<u8>> {
    let diffing = Diffing::new(
        |artifact: &Vec<u8>| artifact.clone(),
        |stored| Ok::<_, DiffingError>(stored.to_vec()),
        |reference, fresh| {
            if reference == fresh {
                None
            } else {
                let at = reference
                    .iter()
                    .zip(fresh.iter())
                    .position(|(a, b)| a != b)
                    .unwrap_or_else(|| reference.len().min(fresh.len()));
                Some(Divergence::new(format!(
                    "byte artifacts differ at offset {at} (reference {} bytes, fresh {} bytes)",
                    reference.len(),
                    fresh.len()
                )))
            }
        },
    );
    Snapshotting::sync(Some("bin"), diffing, |value| value)
}
