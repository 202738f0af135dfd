// src/cache/store.rs

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::cache::fingerprint::Fingerprint;
use crate::errors::Result;
use crate::types::Mode;

/// Name of the fingerprint file inside each mode partition.
const FINGERPRINT_FILE: &str = "fingerprint";

/// Whether `run_if_changed` invoked the wrapped action.
#[derive(Debug)]
pub enum CacheOutcome<T> {
    /// Fingerprint unchanged; the action was not invoked and no side
    /// effect was observed.
    Skipped,
    /// The action ran to completion and the new fingerprint is persisted.
    Ran(T),
}

impl<T> CacheOutcome<T> {
    pub fn ran(&self) -> bool {
        matches!(self, CacheOutcome::Ran(_))
    }
}

/// On-disk store of per-mode fingerprint partitions under one cache root.
///
/// The host pipeline is single-threaded with respect to builds, so the
/// store does no internal locking; concurrent builds would need an
/// external lock around partition access.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one mode's run artifacts.
    pub fn partition_dir(&self, mode: Mode) -> PathBuf {
        self.root.join(mode.as_str())
    }

    fn fingerprint_path(&self, mode: Mode) -> PathBuf {
        self.partition_dir(mode).join(FINGERPRINT_FILE)
    }

    /// Load the persisted fingerprint for a mode.
    ///
    /// A missing, unreadable, or corrupted fingerprint file is not an
    /// error: it reads as `None`, which forces a fresh run.
    pub fn load_fingerprint(&self, mode: Mode) -> Option<Fingerprint> {
        let path = self.fingerprint_path(mode);
        if !path.exists() {
            return None;
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(mode = %mode, error = %err, "unreadable fingerprint file; forcing fresh run");
                return None;
            }
        };

        match Fingerprint::parse(&contents) {
            Some(fp) => Some(fp),
            None => {
                warn!(mode = %mode, "corrupted fingerprint file; forcing fresh run");
                None
            }
        }
    }

    /// Persist the fingerprint for a mode, creating the partition if
    /// needed.
    pub fn save_fingerprint(&self, mode: Mode, fingerprint: &Fingerprint) -> Result<()> {
        let path = self.fingerprint_path(mode);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache partition at {:?}", parent))?;
        }
        fs::write(&path, fingerprint.serialize())
            .with_context(|| format!("writing fingerprint at {:?}", path))?;
        info!(mode = %mode, files = fingerprint.len(), "stored fingerprint");
        Ok(())
    }

    /// Delete the partitions of every mode other than `active`.
    ///
    /// Modes are mutually exclusive build targets: running one makes the
    /// artifacts of the others stale. Called before the active mode runs.
    pub fn drop_stale_partitions(&self, active: Mode) -> Result<()> {
        for mode in Mode::ALL {
            if mode == active {
                continue;
            }
            let dir = self.partition_dir(mode);
            if dir.exists() {
                fs::remove_dir_all(&dir)
                    .with_context(|| format!("removing stale partition {:?}", dir))?;
                debug!(stale = %mode, active = %active, "dropped stale cache partition");
            }
        }
        Ok(())
    }

    /// Run `action` only when the fingerprint over `inputs` differs from
    /// the persisted one for `mode`.
    ///
    /// The new fingerprint is persisted only after `action` completes
    /// successfully; a failed action leaves the prior state untouched, so
    /// failure is never cached as success and the next invocation runs
    /// again.
    pub async fn run_if_changed<T, F, Fut>(
        &self,
        mode: Mode,
        base_dir: &Path,
        inputs: &[PathBuf],
        action: F,
    ) -> Result<CacheOutcome<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let current =
            Fingerprint::compute(base_dir, inputs).context("computing input fingerprint")?;

        if let Some(previous) = self.load_fingerprint(mode) {
            if previous == current {
                info!(mode = %mode, files = current.len(), "inputs unchanged; skipping run");
                return Ok(CacheOutcome::Skipped);
            }
            debug!(mode = %mode, "fingerprint changed");
        } else {
            debug!(mode = %mode, "no prior fingerprint");
        }

        let value = action().await?;

        self.save_fingerprint(mode, &current)?;
        Ok(CacheOutcome::Ran(value))
    }
}
