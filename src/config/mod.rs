// src/config/mod.rs

//! Configuration loading and validation.
//!
//! The config file (`Packwatch.toml` by default) describes the bundler
//! command, the per-mode bundler config files and environments, and the
//! input roots/patterns that feed the incremental cache.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{BundlerSection, ConfigFile, DefaultSection, ModeSection, RawConfigFile};
