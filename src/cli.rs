// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::Mode;

/// Command-line arguments for `packwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "packwatch",
    version,
    about = "Drive a JavaScript bundler with incremental caching and a managed watch process.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Packwatch.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Packwatch.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PACKWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// What to do. Defaults to `run-prod` when omitted.
    #[command(subcommand)]
    pub command: Option<BuildCommand>,
}

/// The fixed command vocabulary.
#[derive(Debug, Clone, Subcommand)]
pub enum BuildCommand {
    /// Run a development build.
    RunDev,
    /// Run a production build (the default).
    RunProd,
    /// Run a test build.
    RunTest,
    /// Start the long-running watch process; replaces any previous one.
    /// Blocks until Ctrl-C.
    StartWatch {
        /// Mode the watcher builds in.
        #[arg(long, value_enum, default_value_t = Mode::Dev)]
        mode: Mode,
    },
    /// Stop the watch process of this session, if one is running.
    StopWatch,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
