// src/inputs.rs

//! Input-file discovery.
//!
//! Walks the mode's root directories and matches relative paths against
//! the include globs. The resulting file set (plus the bundler config
//! file) is what the incremental fingerprint is computed over.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Discover input files under `roots` (relative to `base_dir`) matching
/// the `include` globs.
///
/// - An empty `include` list matches every file.
/// - Missing roots are skipped with a warning rather than failing, so a
///   config can list roots that only exist in some checkouts.
/// - The result is sorted and de-duplicated, giving a stable fingerprint
///   input order.
pub fn discover(base_dir: &Path, roots: &[String], include: &[String]) -> Result<Vec<PathBuf>> {
    let include_set = build_globset(include).context("compiling include patterns")?;

    let mut files = Vec::new();

    for root in roots {
        let root_dir = base_dir.join(root);
        if !root_dir.is_dir() {
            warn!(root = %root_dir.display(), "input root missing; skipping");
            continue;
        }

        for entry in WalkDir::new(&root_dir).follow_links(false) {
            let entry = entry.with_context(|| format!("walking input root {:?}", root_dir))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(rel) = relative_str(&root_dir, entry.path()) {
                if include_set.is_match(&rel) {
                    files.push(entry.path().to_path_buf());
                }
            }
        }
    }

    files.sort();
    files.dedup();
    debug!(count = files.len(), "discovered input files");
    Ok(files)
}

/// Build a GlobSet from simple string patterns; empty means match-all.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    if patterns.is_empty() {
        builder.add(Glob::new("**")?);
    } else {
        for pattern in patterns {
            builder.add(Glob::new(pattern).with_context(|| format!("invalid glob '{pattern}'"))?);
        }
    }
    Ok(builder.build()?)
}

/// Convert a path into a string relative to `root`, with forward slashes.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn discovers_only_matching_files_sorted() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("src/sub"))?;
        fs::write(dir.path().join("src/b.js"), "b")?;
        fs::write(dir.path().join("src/sub/a.js"), "a")?;
        fs::write(dir.path().join("src/readme.md"), "md")?;

        let files = discover(
            dir.path(),
            &["src".to_string()],
            &["**/*.js".to_string()],
        )?;

        let names: Vec<_> = files
            .iter()
            .map(|p| relative_str(dir.path(), p).unwrap())
            .collect();
        assert_eq!(names, ["src/b.js", "src/sub/a.js"]);
        Ok(())
    }

    #[test]
    fn missing_root_is_skipped() -> Result<()> {
        let dir = tempdir()?;
        let files = discover(dir.path(), &["nope".to_string()], &[])?;
        assert!(files.is_empty());
        Ok(())
    }
}
