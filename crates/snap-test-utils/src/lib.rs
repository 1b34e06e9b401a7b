//! Testing utilities for SNAP workspace
//!
//! Hostile and slow capture strategies shared by the engine's own tests:
//! captures that never fire, fire late, fire twice, or panic.

#![allow(missing_docs)]

use snap_diffing::Diffing;
use snap_strategy::{Async, Snapshotting};
use std::thread;
use std::time::Duration;

/// Text strategy whose capture never signals completion
///
/// The completion handle is leaked so the wait always ends in a timeout,
/// never in a dropped-handle abort.
#[must_use]
pub fn never_completing() -> Snapshotting<String, String> {
    Snapshotting::new(Some("txt"), Diffing::lines(), |_value: String| {
        Async::new(|done| std::mem::forget(done))
    })
}

/// Text strategy completing from a background thread after `delay`
#[must_use]
pub fn delayed(delay: Duration) -> Snapshotting<String, String> {
    Snapshotting::new(Some("txt"), Diffing::lines(), move |value: String| {
        Async::new(move |done| {
            thread::spawn(move || {
                thread::sleep(delay);
                done.complete(value);
            });
        })
    })
}

/// Text strategy that violates the protocol by firing twice
#[must_use]
pub fn double_firing() -> Snapshotting<String, String> {
    Snapshotting::new(Some("txt"), Diffing::lines(), |value: String| {
        Async::new(move |done| {
            done.complete(value.clone());
            done.complete(value);
        })
    })
}

/// Text strategy whose capture panics
#[must_use]
pub fn panicking_capture() -> Snapshotting<String, String> {
    Snapshotting::new(Some("txt"), Diffing::lines(), |_value: String| {
        Async::new(|_done| panic!("capture backend failed"))
    })
}
