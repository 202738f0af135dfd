// tests/incremental_cache.rs

//! `run_if_changed` semantics: idempotence, change sensitivity, and
//! failure non-caching.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::tempdir;

use packwatch::cache::{CacheOutcome, CacheStore};
use packwatch::errors::PackwatchError;
use packwatch::types::Mode;
use packwatch_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

struct Fixture {
    _dir: tempfile::TempDir,
    base: PathBuf,
    store: CacheStore,
    inputs: Vec<PathBuf>,
}

fn fixture() -> Fixture {
    init_tracing();
    let dir = tempdir().expect("tempdir");
    let base = dir.path().to_path_buf();

    let config = base.join("bundler.config.js");
    let input = base.join("app.js");
    fs::write(&config, "module.exports = {};").unwrap();
    fs::write(&input, "console.log('hi');").unwrap();

    let store = CacheStore::new(base.join("cache"));
    Fixture {
        _dir: dir,
        base,
        store,
        inputs: vec![config, input],
    }
}

async fn run_counted(fx: &Fixture, mode: Mode, runs: &Arc<AtomicUsize>) -> CacheOutcome<()> {
    let runs = Arc::clone(runs);
    fx.store
        .run_if_changed(mode, &fx.base, &fx.inputs, move || async move {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await
        .expect("run_if_changed")
}

#[tokio::test]
async fn identical_inputs_run_the_action_exactly_once() {
    let fx = fixture();
    let runs = Arc::new(AtomicUsize::new(0));

    let first = run_counted(&fx, Mode::Dev, &runs).await;
    let second = run_counted(&fx, Mode::Dev, &runs).await;

    assert!(first.ran());
    assert!(!second.ran());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn single_byte_change_in_an_input_forces_a_rerun() -> TestResult {
    let fx = fixture();
    let runs = Arc::new(AtomicUsize::new(0));

    run_counted(&fx, Mode::Dev, &runs).await;
    fs::write(fx.base.join("app.js"), "console.log('hI');")?;
    let second = run_counted(&fx, Mode::Dev, &runs).await;

    assert!(second.ran());
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn config_file_change_forces_a_rerun() -> TestResult {
    let fx = fixture();
    let runs = Arc::new(AtomicUsize::new(0));

    run_counted(&fx, Mode::Dev, &runs).await;
    fs::write(fx.base.join("bundler.config.js"), "module.exports = {x:1};")?;
    run_counted(&fx, Mode::Dev, &runs).await;

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn touched_but_unchanged_files_do_not_force_a_rerun() -> TestResult {
    let fx = fixture();
    let runs = Arc::new(AtomicUsize::new(0));

    run_counted(&fx, Mode::Dev, &runs).await;
    // Rewrite identical content; hashing is over content, not mtime.
    fs::write(fx.base.join("app.js"), "console.log('hi');")?;
    run_counted(&fx, Mode::Dev, &runs).await;

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn failed_action_is_not_cached_as_success() {
    let fx = fixture();
    let runs = Arc::new(AtomicUsize::new(0));

    let runs_in_action = Arc::clone(&runs);
    let result: Result<CacheOutcome<()>, _> = fx
        .store
        .run_if_changed(Mode::Dev, &fx.base, &fx.inputs, move || async move {
            runs_in_action.fetch_add(1, Ordering::SeqCst);
            Err(PackwatchError::CommandFailed {
                command: "node".to_string(),
                code: 1,
            })
        })
        .await;
    assert!(result.is_err());

    // Same inputs, but the failure must not have been recorded.
    let retry = run_counted(&fx, Mode::Dev, &runs).await;
    assert!(retry.ran());
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn corrupted_fingerprint_file_reads_as_cold_cache() -> TestResult {
    let fx = fixture();
    let runs = Arc::new(AtomicUsize::new(0));

    run_counted(&fx, Mode::Dev, &runs).await;
    fs::write(
        fx.store.partition_dir(Mode::Dev).join("fingerprint"),
        "not a fingerprint",
    )?;
    let second = run_counted(&fx, Mode::Dev, &runs).await;

    assert!(second.ran());
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn modes_use_separate_partitions() {
    let fx = fixture();
    let dev_runs = Arc::new(AtomicUsize::new(0));
    let prod_runs = Arc::new(AtomicUsize::new(0));

    run_counted(&fx, Mode::Dev, &dev_runs).await;
    // Without dropping stale partitions, prod is simply cold.
    let prod = run_counted(&fx, Mode::Prod, &prod_runs).await;

    assert!(prod.ran());
    assert!(fx.store.partition_dir(Mode::Dev).is_dir());
    assert!(fx.store.partition_dir(Mode::Prod).is_dir());
}
