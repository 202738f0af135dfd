// tests/watch_manager.rs

//! Single-watcher lifecycle: exclusivity, replacement, and stop.

#![cfg(unix)]

use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

use packwatch::bundler::InvocationRequest;
use packwatch::config::BundlerSection;
use packwatch::types::Mode;
use packwatch::watcher::WatchManager;
use packwatch_test_utils::{fake_bundler::FakeBundler, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn pid_alive(pid: u32) -> bool {
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn sleeping_request(base_dir: &Path) -> TestResult {
    FakeBundler::new()
        .log("watching for changes")
        .sleep(30)
        .write(&base_dir.join("bundler.sh"))?;
    Ok(())
}

fn request(base_dir: &Path, mode: Mode) -> InvocationRequest {
    InvocationRequest {
        mode,
        base_dir: base_dir.to_path_buf(),
        config_path: base_dir.join("bundler.config.js"),
        input_files: Vec::new(),
        env: BTreeMap::new(),
        watch: true,
    }
}

fn bundler() -> BundlerSection {
    BundlerSection {
        command: "sh".to_string(),
        script: "bundler.sh".to_string(),
        cache_dir: ".packwatch/cache".to_string(),
    }
}

#[tokio::test]
async fn starting_twice_leaves_exactly_one_live_process() -> TestResult {
    with_timeout(async {
        init_tracing();
        let dir = tempdir()?;
        sleeping_request(dir.path())?;

        let mut manager = WatchManager::new();

        manager.start(&request(dir.path(), Mode::Dev), &bundler()).await?;
        let first_pid = manager.active_id().expect("first watcher pid");
        assert!(pid_alive(first_pid));

        manager.start(&request(dir.path(), Mode::Prod), &bundler()).await?;
        let second_pid = manager.active_id().expect("second watcher pid");

        assert_ne!(first_pid, second_pid);
        assert!(!pid_alive(first_pid), "first watcher must be terminated");
        assert!(pid_alive(second_pid));
        assert_eq!(manager.active_mode(), Some(Mode::Prod));

        manager.stop().await?;
        Ok(())
    })
    .await
}

#[tokio::test]
async fn stop_terminates_the_watcher_and_is_idempotent() -> TestResult {
    with_timeout(async {
        init_tracing();
        let dir = tempdir()?;
        sleeping_request(dir.path())?;

        let mut manager = WatchManager::new();
        manager.start(&request(dir.path(), Mode::Dev), &bundler()).await?;
        let pid = manager.active_id().expect("watcher pid");

        manager.stop().await?;
        assert!(!manager.is_running());
        assert!(!pid_alive(pid));

        // Stopping while idle is a no-op.
        manager.stop().await?;
        assert!(!manager.is_running());
        Ok(())
    })
    .await
}

#[tokio::test]
async fn manager_starts_idle() {
    init_tracing();
    let manager = WatchManager::new();
    assert!(!manager.is_running());
    assert_eq!(manager.active_mode(), None);
    assert_eq!(manager.active_id(), None);
}
