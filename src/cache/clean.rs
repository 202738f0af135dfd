// src/cache/clean.rs

//! Cache-root reconciliation with a preserved partition.
//!
//! After a successful run of mode M, everything under the cache root
//! except M's partition is stale and reclaimed. The preserved partition
//! is round-tripped through a staging directory next to the cache root:
//! move out, delete the root wholesale, recreate it, move back. Move-out
//! completes before any delete and the delete completes before move-back,
//! so an interrupted clean cannot silently lose the preserved files. The
//! staging guard restores the partition on every early exit.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::types::Mode;

/// Reconcile `root` against a preserve-list containing only `keep`'s
/// partition: every other immediate child of the root is deleted, the
/// preserved partition survives byte-identical.
///
/// Must run only after the partition's new fingerprint has been durably
/// persisted.
pub fn clean_preserving(root: &Path, keep: Mode) -> Result<()> {
    let partition = root.join(keep.as_str());

    if !partition.is_dir() {
        // Nothing to preserve; just reset the root to an empty skeleton.
        remove_root(root)?;
        fs::create_dir_all(root).with_context(|| format!("recreating cache root {:?}", root))?;
        return Ok(());
    }

    let staging = staging_dir(root)?;
    let mut staged = StagedPartition::move_out(&partition, &staging)?;

    // Move-out is complete; now the wholesale delete cannot touch the
    // preserved files.
    remove_root(root)?;
    fs::create_dir_all(root).with_context(|| format!("recreating cache root {:?}", root))?;

    staged.restore()?;

    info!(keep = %keep, root = %root.display(), "cleaned cache root around preserved partition");
    Ok(())
}

fn remove_root(root: &Path) -> Result<()> {
    if root.exists() {
        fs::remove_dir_all(root).with_context(|| format!("removing cache root {:?}", root))?;
    }
    Ok(())
}

/// Staging directory as a sibling of the cache root, so the moves stay on
/// one filesystem and `rename` is atomic.
fn staging_dir(root: &Path) -> Result<PathBuf> {
    let parent = root
        .parent()
        .ok_or_else(|| anyhow!("cache root {:?} has no parent directory", root))?;
    let name = root
        .file_name()
        .ok_or_else(|| anyhow!("cache root {:?} has no directory name", root))?;
    Ok(parent.join(format!(".{}.staging", name.to_string_lossy())))
}

/// A partition moved out to staging, with its original location
/// remembered.
///
/// On drop, an unrestored partition is moved back best-effort, so an
/// error between move-out and move-back cannot lose the preserved files.
struct StagedPartition {
    staged: PathBuf,
    original: PathBuf,
    staging_root: PathBuf,
    restored: bool,
}

impl StagedPartition {
    fn move_out(original: &Path, staging_root: &Path) -> Result<Self> {
        fs::create_dir_all(staging_root)
            .with_context(|| format!("creating staging directory {:?}", staging_root))?;

        let name = original
            .file_name()
            .ok_or_else(|| anyhow!("partition {:?} has no directory name", original))?;
        let staged = staging_root.join(name);

        fs::rename(original, &staged)
            .with_context(|| format!("staging partition {:?} -> {:?}", original, staged))?;
        debug!(from = %original.display(), to = %staged.display(), "moved partition to staging");

        Ok(Self {
            staged,
            original: original.to_path_buf(),
            staging_root: staging_root.to_path_buf(),
            restored: false,
        })
    }

    fn restore(&mut self) -> Result<()> {
        if let Some(parent) = self.original.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("recreating partition parent {:?}", parent))?;
        }
        fs::rename(&self.staged, &self.original).with_context(|| {
            format!(
                "restoring partition {:?} -> {:?}",
                self.staged, self.original
            )
        })?;
        self.restored = true;

        // Staging dir is empty now; removal failure is not worth failing
        // the build over.
        let _ = fs::remove_dir(&self.staging_root);
        debug!(to = %self.original.display(), "restored partition from staging");
        Ok(())
    }
}

impl Drop for StagedPartition {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Some(parent) = self.original.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(err) = fs::rename(&self.staged, &self.original) {
            error!(
                staged = %self.staged.display(),
                original = %self.original.display(),
                error = %err,
                "failed to restore staged partition; files remain in staging"
            );
        } else {
            let _ = fs::remove_dir(&self.staging_root);
        }
    }
}
