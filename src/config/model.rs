// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::Mode;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [bundler]
/// command = "node"
/// script = "scripts/bundle.js"
///
/// [default]
/// roots = ["src"]
/// include = ["**/*.js", "**/*.ts"]
///
/// [mode.dev]
/// config = "conf/bundler.dev.js"
/// env = { NODE_ENV = "development" }
/// ```
///
/// Use [`ConfigFile::try_from`] to obtain a validated config.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// `[bundler]` section: how to launch the external tool.
    pub bundler: BundlerSection,

    /// `[default]` section: input roots/patterns shared across modes.
    #[serde(default)]
    pub default: DefaultSection,

    /// `[mode.<name>]` sections, keyed by mode.
    #[serde(default)]
    pub mode: BTreeMap<Mode, ModeSection>,
}

/// Validated configuration. Constructed only through
/// `ConfigFile::try_from(RawConfigFile)` (see `config::validate`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub bundler: BundlerSection,
    pub default: DefaultSection,
    pub mode: BTreeMap<Mode, ModeSection>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        bundler: BundlerSection,
        default: DefaultSection,
        mode: BTreeMap<Mode, ModeSection>,
    ) -> Self {
        Self {
            bundler,
            default,
            mode,
        }
    }

    /// Section for the given mode, if configured.
    pub fn mode_section(&self, mode: Mode) -> Option<&ModeSection> {
        self.mode.get(&mode)
    }
}

/// `[bundler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BundlerSection {
    /// Executable used to launch the bundler (e.g. `"node"`).
    pub command: String,

    /// Path to the bundler driver script, relative to the base directory.
    pub script: String,

    /// Cache root directory holding the per-mode partitions.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

fn default_cache_dir() -> String {
    ".packwatch/cache".to_string()
}

/// `[default]` section: input discovery shared by all modes.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    /// Root directories whose matched files form the watched input set.
    #[serde(default)]
    pub roots: Vec<String>,

    /// Glob patterns (relative to each root) selecting input files.
    ///
    /// An empty list means "every file under the roots".
    #[serde(default)]
    pub include: Vec<String>,
}

/// `[mode.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ModeSection {
    /// Bundler config file for this mode, relative to the base directory.
    pub config: String,

    /// Environment variables merged on top of the ambient environment
    /// when this mode runs.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Optional mode-local input roots. If `None`, `default.roots` apply.
    #[serde(default)]
    pub roots: Option<Vec<String>>,

    /// Optional mode-local include patterns. If `None`, `default.include`
    /// applies.
    #[serde(default)]
    pub include: Option<Vec<String>>,
}

impl ModeSection {
    /// Effective input roots given the `[default]` section.
    pub fn effective_roots<'a>(&'a self, default: &'a DefaultSection) -> &'a [String] {
        match &self.roots {
            Some(roots) => roots,
            None => &default.roots,
        }
    }

    /// Effective include patterns given the `[default]` section.
    pub fn effective_include<'a>(&'a self, default: &'a DefaultSection) -> &'a [String] {
        match &self.include {
            Some(include) => include,
            None => &default.include,
        }
    }
}
