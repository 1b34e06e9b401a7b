//! End-to-end lifecycle tests against a real filesystem

use snap_diffing::Diffing;
use snap_harness::{verify_snapshot, CallSite, Mode, SnapshotConfig};
use snap_strategy::{strategies, Async, Snapshotting};
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

fn site(function: &'static str) -> CallSite {
    CallSite::new(file!(), line!(), function)
}

fn config_in(dir: &TempDir) -> SnapshotConfig {
    init_logging();
    SnapshotConfig::new().with_directory(dir.path())
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn record_writes_named_text_snapshot() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir)
        .with_name("greeting")
        .with_mode(Mode::Record);

    let failure = verify_snapshot(
        || "hello".to_string(),
        &strategies::lines(),
        &config,
        site("testGreeting"),
    );

    assert!(failure.is_none());
    let written = std::fs::read(dir.path().join("greeting.txt")).unwrap();
    assert_eq!(written, b"hello");
}

#[test]
fn record_twice_is_directory_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir)
        .with_name("stable")
        .with_mode(Mode::Record)
        .with_sequence(1);

    for _ in 0..2 {
        let failure = verify_snapshot(
            || "same".to_string(),
            &strategies::lines(),
            &config,
            site("testIdempotent"),
        );
        assert!(failure.is_none());
    }
}

#[test]
fn timeout_reports_failure_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir)
        .with_name("slow")
        .with_mode(Mode::Record)
        .with_timeout(Duration::from_millis(100));

    let failure = verify_snapshot(
        || "never arrives".to_string(),
        &snap_test_utils::never_completing(),
        &config,
        site("testTimesOut"),
    )
    .expect("timeout must fail");

    assert!(failure.message().contains("timed out"));
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(entries.is_empty(), "no file may be written on timeout");
}

#[test]
fn verify_passes_against_recorded_baseline() {
    let dir = TempDir::new().unwrap();
    let base = config_in(&dir).with_name("baseline").with_sequence(1);

    let recorded = verify_snapshot(
        || "stable output".to_string(),
        &strategies::lines(),
        &base.clone().with_mode(Mode::Record),
        site("testBaseline"),
    );
    assert!(recorded.is_none());

    let verified = verify_snapshot(
        || "stable output".to_string(),
        &strategies::lines(),
        &base.with_mode(Mode::Verify),
        site("testBaseline"),
    );
    assert!(verified.is_none());
}

#[test]
fn verify_mismatch_reports_line_diff() {
    let dir = TempDir::new().unwrap();
    let base = config_in(&dir).with_name("drift").with_sequence(1);

    verify_snapshot(
        || "hello".to_string(),
        &strategies::lines(),
        &base.clone().with_mode(Mode::Record),
        site("testDrift"),
    );

    let failure = verify_snapshot(
        || "goodbye".to_string(),
        &strategies::lines(),
        &base.with_mode(Mode::Verify),
        site("testDrift"),
    )
    .expect("mismatch must fail");

    assert!(failure.message().contains("snapshot mismatch"));
    assert!(failure.message().contains("- hello"));
    assert!(failure.message().contains("+ goodbye"));
    assert!(failure.message().contains("drift.txt"));
}

#[test]
fn verify_missing_baseline_records_then_passes() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_name("fresh").with_sequence(1);

    let first = verify_snapshot(
        || "new output".to_string(),
        &strategies::lines(),
        &config,
        site("testFreshBaseline"),
    )
    .expect("first run must report, not silently pass");
    assert!(first.message().contains("no reference snapshot"));
    assert!(dir.path().join("fresh.txt").exists());

    let second = verify_snapshot(
        || "new output".to_string(),
        &strategies::lines(),
        &config,
        site("testFreshBaseline"),
    );
    assert!(second.is_none());
}

#[test]
fn sequential_snapshots_get_distinct_files() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_mode(Mode::Record);

    for _ in 0..2 {
        let failure = verify_snapshot(
            || "page".to_string(),
            &strategies::lines(),
            &config,
            site("testPaginates"),
        );
        assert!(failure.is_none());
    }

    assert!(dir.path().join("Paginates.txt").exists());
    assert!(dir.path().join("Paginates.2.txt").exists());
}

#[test]
fn default_name_strips_test_prefix() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_mode(Mode::Record).with_sequence(1);

    verify_snapshot(
        || "header".to_string(),
        &strategies::lines(),
        &config,
        site("testRendersHeader"),
    );

    assert!(dir.path().join("RendersHeader.txt").exists());
}

#[test]
fn construction_panic_is_reported_not_propagated() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_name("boom").with_mode(Mode::Record);

    let failure = verify_snapshot(
        || -> String { panic!("could not build view") },
        &strategies::lines(),
        &config,
        site("testConstructionFails"),
    )
    .expect("construction panic must fail");

    assert!(failure.message().contains("value construction failed"));
    assert!(failure.message().contains("could not build view"));
    assert!(!dir.path().join("boom.txt").exists());
}

#[test]
fn json_serialization_failure_is_reported_not_propagated() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_name("badjson").with_mode(Mode::Record);

    // serde_json rejects non-string map keys at serialization time.
    let failure = verify_snapshot(
        || {
            let mut value = HashMap::new();
            value.insert(vec![1_u8], 2_u8);
            value
        },
        &strategies::json::<HashMap<Vec<u8>, u8>>(),
        &config,
        site("testBadJson"),
    )
    .expect("serialization failure must report, not panic");

    assert!(failure.message().contains("JSON serialization failed"));
    assert!(!dir.path().join("badjson.json").exists());
}

#[test]
fn eager_capture_panic_is_reported_not_propagated() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_name("eager").with_mode(Mode::Record);
    let eager: Snapshotting<String, String> =
        Snapshotting::new(Some("txt"), Diffing::lines(), |_value: String| -> Async<String> {
            panic!("backend refused the value")
        });

    let failure = verify_snapshot(
        || "doomed".to_string(),
        &eager,
        &config,
        site("testEagerCapturePanic"),
    )
    .expect("eager capture panic must report, not panic");

    assert!(failure.message().contains("backend refused the value"));
    assert!(!dir.path().join("eager.txt").exists());
}

#[test]
fn double_fire_surfaces_as_capture_failure() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_name("twice").with_mode(Mode::Record);

    let failure = verify_snapshot(
        || "value".to_string(),
        &snap_test_utils::double_firing(),
        &config,
        site("testDoubleFire"),
    )
    .expect("protocol violation must fail");

    assert!(failure.message().contains("more than once"));
    assert!(!dir.path().join("twice.txt").exists());
}

#[test]
fn delayed_capture_completes_within_timeout() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir)
        .with_name("rendered")
        .with_mode(Mode::Record)
        .with_timeout(Duration::from_secs(2));

    let failure = verify_snapshot(
        || "painted".to_string(),
        &snap_test_utils::delayed(Duration::from_millis(20)),
        &config,
        site("testDelayedRender"),
    );

    assert!(failure.is_none());
    let written = std::fs::read(dir.path().join("rendered.txt")).unwrap();
    assert_eq!(written, b"painted");
}

#[test]
fn pullback_strategy_flows_through_lifecycle() {
    let dir = TempDir::new().unwrap();
    let counts: Snapshotting<Vec<&'static str>, String> =
        strategies::lines().pullback(|items: Vec<&'static str>| items.join("\n"));
    let base = config_in(&dir).with_name("list").with_sequence(1);

    verify_snapshot(
        || vec!["a", "b"],
        &counts,
        &base.clone().with_mode(Mode::Record),
        site("testList"),
    );
    let verified = verify_snapshot(
        || vec!["a", "b"],
        &counts,
        &base.with_mode(Mode::Verify),
        site("testList"),
    );
    assert!(verified.is_none());
}

#[test]
fn strategy_without_extension_writes_bare_name() {
    let dir = TempDir::new().unwrap();
    let bare: Snapshotting<String, String> =
        Snapshotting::sync(None, Diffing::lines(), |value| value);
    let config = config_in(&dir).with_name("raw").with_mode(Mode::Record);

    let failure = verify_snapshot(|| "data".to_string(), &bare, &config, site("testBareName"));

    assert!(failure.is_none());
    assert!(dir.path().join("raw").exists());
}

#[test]
fn assert_snapshot_macro_records() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_name("macro").with_mode(Mode::Record);

    snap_harness::assert_snapshot!(
        "from macro".to_string(),
        &strategies::lines(),
        "testMacro",
        config
    );

    let written = std::fs::read(dir.path().join("macro.txt")).unwrap();
    assert_eq!(written, b"from macro");
}

#[test]
fn failure_is_attributed_to_call_site() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir)
        .with_name("attributed")
        .with_timeout(Duration::from_millis(50));

    let failure = verify_snapshot(
        || "x".to_string(),
        &snap_test_utils::never_completing(),
        &config,
        CallSite::new(file!(), 123, "testAttribution"),
    )
    .expect("must fail");

    assert_eq!(failure.call_site().function, "testAttribution");
    assert_eq!(failure.call_site().line, 123);
    assert!(failure.to_string().contains("testAttribution"));
}
