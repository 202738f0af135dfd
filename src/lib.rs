// src/lib.rs

pub mod bundler;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod inputs;
pub mod logging;
pub mod session;
pub mod types;
pub mod watcher;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::cli::{BuildCommand, CliArgs};
use crate::config::load_and_validate;
use crate::errors::Result;
use crate::session::Session;
use crate::types::Mode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the session (cache store + watch manager)
/// - command dispatch (default: `run-prod`)
/// - Ctrl-C handling for the watch process
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let base_dir = config_base_dir(&config_path);
    let mut session = Session::new(cfg, base_dir);

    let command = args.command.unwrap_or(BuildCommand::RunProd);
    match command {
        BuildCommand::RunDev => print_payloads(session.run_build(Mode::Dev).await?),
        BuildCommand::RunProd => print_payloads(session.run_build(Mode::Prod).await?),
        BuildCommand::RunTest => print_payloads(session.run_build(Mode::Test).await?),
        BuildCommand::StartWatch { mode } => {
            session.start_watch(mode).await?;
            info!(mode = %mode, "watch process running; press Ctrl-C to stop");

            tokio::signal::ctrl_c()
                .await
                .context("listening for Ctrl+C")?;

            // Host shutdown: no watch subprocess may outlive us.
            session.shutdown().await?;
        }
        BuildCommand::StopWatch => {
            // Meaningful for hosts embedding `Session`; a fresh CLI
            // process has nothing to stop.
            session.stop_watch().await?;
            info!("stop-watch handled");
        }
    }

    Ok(())
}

/// Result payloads go to stdout, one JSON document per line; logs stay
/// on stderr.
fn print_payloads(payloads: Vec<serde_json::Value>) {
    for payload in payloads {
        println!("{payload}");
    }
}

/// Base directory for the build: the directory containing the config
/// file, falling back to the current working directory for a bare
/// filename like "Packwatch.toml".
fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
