#![allow(dead_code)]

use std::collections::BTreeMap;

use packwatch::config::{BundlerSection, ConfigFile, DefaultSection, ModeSection, RawConfigFile};
use packwatch::types::Mode;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    /// A config launching `command` with `script`. Add at least one mode
    /// before calling `build`.
    pub fn new(command: &str, script: &str) -> Self {
        Self {
            config: RawConfigFile {
                bundler: BundlerSection {
                    command: command.to_string(),
                    script: script.to_string(),
                    cache_dir: ".packwatch/cache".to_string(),
                },
                default: DefaultSection::default(),
                mode: BTreeMap::new(),
            },
        }
    }

    pub fn with_cache_dir(mut self, dir: &str) -> Self {
        self.config.bundler.cache_dir = dir.to_string();
        self
    }

    pub fn with_default_root(mut self, root: &str) -> Self {
        self.config.default.roots.push(root.to_string());
        self
    }

    pub fn with_default_include(mut self, pattern: &str) -> Self {
        self.config.default.include.push(pattern.to_string());
        self
    }

    pub fn with_mode(mut self, mode: Mode, section: ModeSection) -> Self {
        self.config.mode.insert(mode, section);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

/// Builder for `ModeSection`.
pub struct ModeSectionBuilder {
    section: ModeSection,
}

impl ModeSectionBuilder {
    pub fn new(config: &str) -> Self {
        Self {
            section: ModeSection {
                config: config.to_string(),
                env: BTreeMap::new(),
                roots: None,
                include: None,
            },
        }
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.section.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn root(mut self, root: &str) -> Self {
        self.section
            .roots
            .get_or_insert_with(Vec::new)
            .push(root.to_string());
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.section
            .include
            .get_or_insert_with(Vec::new)
            .push(pattern.to_string());
        self
    }

    pub fn build(self) -> ModeSection {
        self.section
    }
}
