// src/bundler/mod.rs

//! Bundler subprocess layer.
//!
//! This module owns launching the external bundler with
//! `tokio::process::Command` and recovering structured results from its
//! output stream.
//!
//! - [`invocation`] builds the per-run request and the concrete command
//!   line (script path, config path, URL-encoded options).
//! - [`protocol`] demultiplexes each stdout line into human-readable log
//!   text and an optional trailing JSON payload.
//! - [`runner`] performs the actual launch: a blocking run that returns
//!   the decoded payloads, and a detached spawn used for the watch
//!   process.

pub mod invocation;
pub mod protocol;
pub mod runner;

pub use invocation::{CommandLine, InvocationRequest};
pub use protocol::{split_line, OutputDemux, SplitLine, RESULT_SENTINEL};
pub use runner::{run, spawn, BundlerProcess};
