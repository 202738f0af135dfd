// src/session.rs

//! Host build-pipeline context.
//!
//! A [`Session`] owns the validated config, the cache store, and the
//! watch-process manager for one host process. All build and watch
//! operations go through it, which is what guarantees the ordering
//! invariants: a build never runs concurrently with a watcher, partition
//! cleanup only follows a successful run, and shutdown tears the watcher
//! down.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::bundler::invocation::InvocationRequest;
use crate::bundler::runner;
use crate::cache::{clean_preserving, CacheOutcome, CacheStore};
use crate::config::{ConfigFile, ModeSection};
use crate::errors::{PackwatchError, Result};
use crate::inputs;
use crate::types::Mode;
use crate::watcher::WatchManager;

pub struct Session {
    config: ConfigFile,
    base_dir: PathBuf,
    cache: CacheStore,
    watcher: WatchManager,
}

impl Session {
    pub fn new(config: ConfigFile, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let cache = CacheStore::new(base_dir.join(&config.bundler.cache_dir));
        Self {
            config,
            base_dir,
            cache,
            watcher: WatchManager::new(),
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn watch_running(&self) -> bool {
        self.watcher.is_running()
    }

    /// Pid of the active watch process, if any. Read-only; lifecycle
    /// changes go through `start_watch`/`stop_watch`.
    pub fn watch_pid(&self) -> Option<u32> {
        self.watcher.active_id()
    }

    /// Run a full build for `mode`, skipping the bundler when the input
    /// fingerprint is unchanged.
    ///
    /// Returns the decoded result payloads (empty when the run was
    /// skipped). Any running watcher is stopped first: the watcher
    /// triggers its own rebuilds internally, and a build must never run
    /// concurrently against the same configuration.
    pub async fn run_build(&mut self, mode: Mode) -> Result<Vec<Value>> {
        self.watcher.stop().await?;
        self.ensure_cache_isolated()?;

        let request = self.build_request(mode, false)?;
        let bundler = self.config.bundler.clone();

        self.cache.drop_stale_partitions(mode)?;

        let fingerprint_inputs = request.fingerprint_inputs();
        let outcome = self
            .cache
            .run_if_changed(mode, &self.base_dir, &fingerprint_inputs, || {
                runner::run(&request, &bundler)
            })
            .await?;

        match outcome {
            CacheOutcome::Skipped => {
                info!(mode = %mode, "build skipped; nothing changed");
                Ok(Vec::new())
            }
            CacheOutcome::Ran(payloads) => {
                // The fingerprint is persisted at this point; reclaiming
                // the rest of the cache root is safe.
                clean_preserving(self.cache.root(), mode)?;
                Ok(payloads)
            }
        }
    }

    /// Start the long-running watch process for `mode`, replacing any
    /// previous watcher.
    pub async fn start_watch(&mut self, mode: Mode) -> Result<()> {
        let request = self.build_request(mode, true)?;
        let bundler = self.config.bundler.clone();
        self.watcher.start(&request, &bundler).await
    }

    /// Stop the watch process, if one is running.
    pub async fn stop_watch(&mut self) -> Result<()> {
        self.watcher.stop().await
    }

    /// Host shutdown hook: force-stop the watcher so no watch subprocess
    /// outlives the host process.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.watcher.stop().await
    }

    /// The cache root is deleted wholesale during partition cleanup, so
    /// it must sit strictly outside the project tree's own files. Config
    /// validation rejects relative cache dirs that resolve to the base
    /// directory; this catches absolute ones that land on it or above.
    fn ensure_cache_isolated(&self) -> Result<()> {
        let root = normalize_path(self.cache.root());
        let base = normalize_path(&self.base_dir);
        if base.starts_with(&root) {
            return Err(PackwatchError::ConfigError(format!(
                "cache_dir {:?} resolves to the project directory or above; \
                 refusing to manage it",
                self.cache.root()
            )));
        }
        Ok(())
    }

    fn build_request(&self, mode: Mode, watch: bool) -> Result<InvocationRequest> {
        let section = self.mode_section(mode)?;

        let roots = section.effective_roots(&self.config.default);
        let include = section.effective_include(&self.config.default);
        let input_files = inputs::discover(&self.base_dir, roots, include)?;

        let env: BTreeMap<String, String> = section.env.clone();

        Ok(InvocationRequest {
            mode,
            base_dir: self.base_dir.clone(),
            config_path: self.base_dir.join(&section.config),
            input_files,
            env,
            watch,
        })
    }

    fn mode_section(&self, mode: Mode) -> Result<&ModeSection> {
        self.config.mode_section(mode).ok_or_else(|| {
            PackwatchError::ConfigError(format!("no [mode.{mode}] section in config"))
        })
    }
}

/// Lexical normalization: drops `.` components and folds `..` into the
/// preceding component. Does not touch the filesystem, so it works for
/// paths that do not exist yet.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
