// src/config/validate.rs

use std::path::{Component, Path};

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PackwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PackwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.bundler, raw.default, raw.mode))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_bundler_section(cfg)?;
    ensure_has_modes(cfg)?;
    validate_mode_sections(cfg)?;
    validate_patterns(cfg)?;
    Ok(())
}

fn validate_bundler_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.bundler.command.trim().is_empty() {
        return Err(PackwatchError::ConfigError(
            "[bundler].command must not be empty".to_string(),
        ));
    }
    if cfg.bundler.script.trim().is_empty() {
        return Err(PackwatchError::ConfigError(
            "[bundler].script must not be empty".to_string(),
        ));
    }
    if cfg.bundler.cache_dir.trim().is_empty() {
        return Err(PackwatchError::ConfigError(
            "[bundler].cache_dir must not be empty".to_string(),
        ));
    }
    validate_cache_dir(&cfg.bundler.cache_dir)?;
    Ok(())
}

/// The cache root gets wiped wholesale on every clean, so a `cache_dir`
/// that resolves to the project directory itself (`.`, `build/..`) or
/// anywhere above it (`..`) would take the project's files with it.
fn validate_cache_dir(cache_dir: &str) -> Result<()> {
    let mut depth: i64 = 0;
    for component in Path::new(cache_dir).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::ParentDir => depth -= 1,
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
        if depth < 0 {
            return Err(PackwatchError::ConfigError(format!(
                "[bundler].cache_dir '{cache_dir}' escapes the project directory"
            )));
        }
    }
    if depth == 0 {
        return Err(PackwatchError::ConfigError(format!(
            "[bundler].cache_dir '{cache_dir}' resolves to the project directory itself"
        )));
    }
    Ok(())
}

fn ensure_has_modes(cfg: &RawConfigFile) -> Result<()> {
    if cfg.mode.is_empty() {
        return Err(PackwatchError::ConfigError(
            "config must contain at least one [mode.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_mode_sections(cfg: &RawConfigFile) -> Result<()> {
    for (mode, section) in cfg.mode.iter() {
        if section.config.trim().is_empty() {
            return Err(PackwatchError::ConfigError(format!(
                "[mode.{mode}].config must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    let mode_patterns = cfg
        .mode
        .iter()
        .flat_map(|(_, s)| s.include.iter().flatten());

    for pattern in cfg.default.include.iter().chain(mode_patterns) {
        Glob::new(pattern).map_err(|e| {
            PackwatchError::ConfigError(format!("invalid include pattern '{pattern}': {e}"))
        })?;
    }
    Ok(())
}
