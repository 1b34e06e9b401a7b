//! Per-test snapshot sequence counters
//!
//! A test that records several snapshots needs distinct file names. The
//! registry hands out 1-based sequence numbers keyed by (source file,
//! test name); the identity layer turns sequence N >= 2 into a `.N`
//! file-name suffix.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

static GLOBAL: Lazy<CounterRegistry> = Lazy::new(CounterRegistry::new);

/// Process-global registry used when callers do not manage sequences
pub fn global() -> &'static CounterRegistry {
    &GLOBAL
}

/// Sequence-number registry keyed by (source file, test name)
#[derive(Debug, Default)]
pub struct CounterRegistry {
    counters: Mutex<HashMap<(PathBuf, String), u32>>,
}

impl CounterRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next sequence number for a test, starting at 1
    pub fn next_sequence(&self, source_file: &Path, test_name: &str) -> u32 {
        let mut counters = self.counters.lock();
        let counter = counters
            .entry((source_file.to_path_buf(), test_name.to_string()))
            .or_insert(0);
        *counter += 1;
        *counter
    }
}
