// src/cache/fingerprint.rs

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

/// Content-hash summary of one invocation's input set.
///
/// Entries map a path (relative to the base directory where possible) to
/// the blake3 hash of the file's contents. Hashing is over content, not
/// modification time, so the fingerprint is stable under clock skew,
/// checkout/restore, and touched-but-unchanged files.
///
/// Two invocations of the same mode with equal fingerprints are
/// semantically equivalent and the second is skippable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fingerprint {
    entries: BTreeMap<String, String>,
}

impl Fingerprint {
    /// Compute the fingerprint over the given files.
    ///
    /// Order of `paths` does not matter; entries are keyed by path.
    /// Paths that are not regular files are skipped.
    pub fn compute<I, P>(base_dir: &Path, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut entries = BTreeMap::new();

        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                continue;
            }
            let key = relative_key(base_dir, path);
            let hash = compute_file_hash(path)?;
            debug!(path = %key, hash = %hash, "hashed input file");
            entries.insert(key, hash);
        }

        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serialize as one `<hash> <path>` line per entry.
    ///
    /// The hash comes first because paths may contain whitespace.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (path, hash) in self.entries.iter() {
            let _ = writeln!(out, "{hash} {path}");
        }
        out
    }

    /// Parse the serialized form. Returns `None` on any malformed line:
    /// a corrupted fingerprint file is treated as "no prior fingerprint"
    /// by the caller, never as an error.
    pub fn parse(contents: &str) -> Option<Self> {
        let mut entries = BTreeMap::new();

        for line in contents.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (hash, path) = trimmed.split_once(' ')?;
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            entries.insert(path.to_string(), hash.to_string());
        }

        Some(Self { entries })
    }
}

/// Compute the blake3 hash of a single file's contents.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Key a path relative to the base directory, with forward slashes so
/// fingerprints are comparable across platforms.
fn relative_key(base_dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base_dir).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn equal_content_gives_equal_fingerprints() -> Result<()> {
        let dir = tempdir()?;
        let f1 = dir.path().join("a.js");
        let f2 = dir.path().join("b.js");
        fs::write(&f1, "let a = 1;")?;
        fs::write(&f2, "let b = 2;")?;

        let fp1 = Fingerprint::compute(dir.path(), [&f1, &f2])?;
        let fp2 = Fingerprint::compute(dir.path(), [&f2, &f1])?;
        assert_eq!(fp1, fp2);

        fs::write(&f1, "let a = 2;")?;
        let fp3 = Fingerprint::compute(dir.path(), [&f1, &f2])?;
        assert_ne!(fp1, fp3);

        Ok(())
    }

    #[test]
    fn serialized_form_parses_back() -> Result<()> {
        let dir = tempdir()?;
        let f = dir.path().join("mod with space.js");
        fs::write(&f, "export {};")?;

        let fp = Fingerprint::compute(dir.path(), [&f])?;
        let parsed = Fingerprint::parse(&fp.serialize()).expect("round-trip parse");
        assert_eq!(fp, parsed);

        Ok(())
    }

    #[test]
    fn corrupted_contents_parse_as_none() {
        assert!(Fingerprint::parse("garbage").is_none());
        assert!(Fingerprint::parse("deadbeef src/a.js").is_none());
        // Empty file is a valid, empty fingerprint.
        assert_eq!(Fingerprint::parse(""), Some(Fingerprint::default()));
    }
}
