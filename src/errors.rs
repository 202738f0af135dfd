// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! The bundler-facing failure surface is deliberately small:
//! [`PackwatchError::CommandNotFound`] (the subprocess could not be
//! launched) and [`PackwatchError::CommandFailed`] (it ran and exited
//! non-zero). Both carry the offending command name for diagnostics.
//! [`PackwatchError::PayloadDecode`] escalates a malformed result payload
//! as an invocation failure so that an empty result list always means
//! "no payload emitted", never "payload emitted but undecodable".

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackwatchError {
    #[error("command not found: '{command}': {source}")]
    CommandNotFound {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command '{command}' failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("malformed result payload in bundler output line {line:?}: {source}")]
    PayloadDecode {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PackwatchError>;
