//! Snapshot identity and path resolution
//!
//! Derives the canonical on-disk location for one snapshot from the
//! calling test's identity. The derivation is deterministic: identical
//! inputs always resolve to the byte-identical path, across repeated
//! calls and across process runs.

use std::path::{Path, PathBuf};

/// Directory component holding reference files next to their test source
pub const SNAPSHOT_DIR_NAME: &str = "__Snapshots__";

/// Identity of one snapshot within one test
///
/// Computed fresh per snapshot call and not persisted beyond it.
///
/// # Invariants
/// - The derived file name is a sanitized, filesystem-safe component
/// - Resolution is a pure function of the fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotIdentity {
    source_file: PathBuf,
    test_name: String,
    name: Option<String>,
    sequence: u32,
    extension: Option<String>,
    directory: Option<PathBuf>,
}

impl SnapshotIdentity {
    /// Create an identity for a test in a source file
    #[must_use]
    pub fn new(source_file: impl Into<PathBuf>, test_name: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            test_name: test_name.into(),
            name: None,
            sequence: 1,
            extension: None,
            directory: None,
        }
    }

    /// Set an explicit snapshot name, overriding test-name derivation
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: Option<&str>) -> Self {
        self.name = name.map(str::to_string);
        self
    }

    /// Set the 1-based sequence number within the test
    #[inline]
    #[must_use]
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set the strategy's file extension (without the dot)
    #[inline]
    #[must_use]
    pub fn with_extension(mut self, extension: Option<&str>) -> Self {
        self.extension = extension.map(str::to_string);
        self
    }

    /// Override the snapshot directory
    #[inline]
    #[must_use]
    pub fn with_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.directory = directory;
        self
    }

    /// Source file base name without extension
    #[must_use]
    pub fn file_base_name(&self) -> String {
        self.source_file
            .file_stem()
            .map_or_else(String::new, |stem| stem.to_string_lossy().into_owned())
    }

    /// Directory holding this snapshot's reference file
    ///
    /// The explicit override wins; otherwise
    /// `<dir-of-source-file>/__Snapshots__/<file-base-name>`.
    #[must_use]
    pub fn snapshot_directory(&self) -> PathBuf {
        if let Some(directory) = &self.directory {
            return directory.clone();
        }
        self.source_file
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(SNAPSHOT_DIR_NAME)
            .join(self.file_base_name())
    }

    /// Sanitized snapshot name, with the sequence suffix when needed
    ///
    /// An explicit name is sanitized and used verbatim; otherwise the test
    /// name with a literal leading `test` prefix stripped. Sequence 1 keeps
    /// the bare name; sequence N >= 2 yields `<name>.<N>`.
    #[must_use]
    pub fn snapshot_name(&self) -> String {
        let base = match &self.name {
            Some(explicit) => sanitize_path_component(explicit),
            None => sanitize_path_component(strip_test_prefix(&self.test_name)),
        };
        if self.sequence > 1 {
            format!("{base}.{}", self.sequence)
        } else {
            base
        }
    }

    /// Final reference-file path
    #[must_use]
    pub fn resolve(&self) -> PathBuf {
        let mut file_name = self.snapshot_name();
        if let Some(extension) = &self.extension {
            file_name.push('.');
            file_name.push_str(extension);
        }
        self.snapshot_directory().join(file_name)
    }
}

/// Strip a literal leading `test` prefix from a test name
///
/// `testFooBar` becomes `FooBar`; `fooBar` is returned unchanged. A name
/// that is exactly `test` is kept as-is rather than collapsing to an
/// empty file name.
#[must_use]
pub fn strip_test_prefix(test_name: &str) -> &str {
    match test_name.strip_prefix("test") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => test_name,
    }
}

/// Replace filesystem-hostile characters with `-`
///
/// Pure: the same input always yields the same output. Separators, shell
/// metacharacters that are illegal in path components on common
/// filesystems, and control characters are all substituted.
#[must_use]
pub fn sanitize_path_component(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn identity() -> SnapshotIdentity {
        SnapshotIdentity::new("/repo/tests/header_tests.rs", "testRendersHeader")
    }

    #[test]
    fn default_directory_derivation() {
        assert_eq!(
            identity().snapshot_directory(),
            PathBuf::from("/repo/tests/__Snapshots__/header_tests")
        );
    }

    #[test]
    fn directory_override_wins() {
        let id = identity().with_directory(Some(PathBuf::from("/tmp/snaps")));
        assert_eq!(id.snapshot_directory(), PathBuf::from("/tmp/snaps"));
    }

    #[test]
    fn test_prefix_is_stripped() {
        assert_eq!(identity().snapshot_name(), "RendersHeader");
    }

    #[test]
    fn no_prefix_left_unchanged() {
        let id = SnapshotIdentity::new("/repo/a.rs", "fooBar");
        assert_eq!(id.snapshot_name(), "fooBar");
    }

    #[test]
    fn bare_test_name_is_kept() {
        let id = SnapshotIdentity::new("/repo/a.rs", "test");
        assert_eq!(id.snapshot_name(), "test");
    }

    #[test]
    fn explicit_name_used_verbatim_after_sanitizing() {
        let id = identity().with_name(Some("greeting"));
        assert_eq!(id.snapshot_name(), "greeting");

        let hostile = identity().with_name(Some("a/b:c"));
        assert_eq!(hostile.snapshot_name(), "a-b-c");
    }

    #[test]
    fn sequence_suffix_from_two() {
        assert_eq!(identity().with_sequence(1).snapshot_name(), "RendersHeader");
        assert_eq!(
            identity().with_sequence(2).snapshot_name(),
            "RendersHeader.2"
        );
    }

    #[test]
    fn resolve_scenario() {
        let id = identity()
            .with_name(Some("greeting"))
            .with_directory(Some(PathBuf::from("/tmp/snaps")))
            .with_extension(Some("txt"));
        assert_eq!(id.resolve(), PathBuf::from("/tmp/snaps/greeting.txt"));
    }

    #[test]
    fn resolve_without_extension() {
        let id = identity().with_directory(Some(PathBuf::from("/tmp/snaps")));
        assert_eq!(id.resolve(), PathBuf::from("/tmp/snaps/RendersHeader"));
    }

    #[test]
    fn resolution_is_stable_across_calls() {
        let id = identity().with_extension(Some("txt"));
        assert_eq!(id.resolve(), id.resolve());
    }

    #[test]
    fn sanitize_replaces_hostile_characters() {
        assert_eq!(sanitize_path_component("a/b\\c:d*e"), "a-b-c-d-e");
        assert_eq!(sanitize_path_component("ok_name-1"), "ok_name-1");
        assert_eq!(sanitize_path_component("tab\there"), "tab-here");
    }

    proptest! {
        #[test]
        fn sanitize_is_pure(raw in ".*") {
            prop_assert_eq!(
                sanitize_path_component(&raw),
                sanitize_path_component(&raw)
            );
        }

        #[test]
        fn sanitize_is_idempotent(raw in ".*") {
            let once = sanitize_path_component(&raw);
            prop_assert_eq!(sanitize_path_component(&once), once);
        }

        #[test]
        fn sanitize_output_has_no_hostile_characters(raw in ".*") {
            let clean = sanitize_path_component(&raw);
            let has_hostile = clean.chars().any(|c| {
                matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
                    || c.is_control()
            });
            prop_assert!(!has_hostile);
        }
    }
}
