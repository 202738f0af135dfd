// tests/partition_clean.rs

//! Mode isolation of cache partitions and preserve-on-clean behaviour.

use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::tempdir;

use packwatch::cache::{clean_preserving, CacheStore};
use packwatch::types::Mode;
use packwatch_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn child_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn clean_preserves_the_active_partition_byte_identical() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let root = dir.path().join("cache");

    // Active partition with a fingerprint and a nested artifact.
    let dev = root.join("dev");
    fs::create_dir_all(dev.join("chunks"))?;
    fs::write(dev.join("fingerprint"), "aa bb\n")?;
    fs::write(dev.join("chunks/main.js"), "bundle bytes")?;

    // Stale siblings of every shape.
    fs::create_dir_all(root.join("prod"))?;
    fs::write(root.join("prod").join("fingerprint"), "stale")?;
    fs::create_dir_all(root.join("leftover/dir"))?;
    fs::write(root.join("stray.txt"), "stray")?;

    clean_preserving(&root, Mode::Dev)?;

    assert_eq!(child_names(&root), ["dev"]);
    assert_eq!(fs::read(dev.join("fingerprint"))?, b"aa bb\n");
    assert_eq!(fs::read(dev.join("chunks/main.js"))?, b"bundle bytes");

    // No staging residue next to the cache root.
    assert_eq!(child_names(dir.path()), ["cache"]);
    Ok(())
}

#[test]
fn clean_with_missing_partition_resets_the_root() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let root = dir.path().join("cache");
    fs::create_dir_all(root.join("prod"))?;
    fs::write(root.join("prod").join("fingerprint"), "stale")?;

    clean_preserving(&root, Mode::Dev)?;

    assert!(root.is_dir());
    assert!(child_names(&root).is_empty());
    Ok(())
}

#[tokio::test]
async fn running_another_mode_invalidates_the_previous_partition() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let base = dir.path().to_path_buf();
    fs::write(base.join("app.js"), "let x = 1;")?;
    let inputs = vec![base.join("app.js")];
    let store = CacheStore::new(base.join("cache"));
    let runs = Arc::new(AtomicUsize::new(0));

    let run = |mode: Mode| {
        let store = store.clone();
        let base = base.clone();
        let inputs = inputs.clone();
        let runs = Arc::clone(&runs);
        async move {
            store.drop_stale_partitions(mode).unwrap();
            let outcome = store
                .run_if_changed(mode, &base, &inputs, move || async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
                .unwrap();
            clean_preserving(store.root(), mode).unwrap();
            outcome.ran()
        }
    };

    // Mode A, then mode B: A's partition must be gone, B's intact.
    assert!(run(Mode::Dev).await);
    assert!(run(Mode::Prod).await);
    assert!(!store.partition_dir(Mode::Dev).exists());
    assert!(store.partition_dir(Mode::Prod).is_dir());

    // A again: cold cache, because B's run deleted A's partition.
    assert!(run(Mode::Dev).await);
    assert_eq!(runs.load(Ordering::SeqCst), 3);
    Ok(())
}
