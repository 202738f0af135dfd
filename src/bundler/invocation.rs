// src/bundler/invocation.rs

//! Per-run invocation request and command-line construction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::json;

use crate::config::BundlerSection;
use crate::types::Mode;

/// Everything one bundler invocation needs. Constructed fresh per run and
/// immutable once built.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub mode: Mode,
    /// Working directory for the subprocess.
    pub base_dir: PathBuf,
    /// Resolved bundler config file for this mode.
    pub config_path: PathBuf,
    /// Matched input files; together with `config_path` these form the
    /// fingerprint input set.
    pub input_files: Vec<PathBuf>,
    /// Environment merged on top of the ambient environment.
    pub env: BTreeMap<String, String>,
    /// Whether the bundler should stay alive and rebuild on changes.
    pub watch: bool,
}

impl InvocationRequest {
    /// The file set the incremental fingerprint is computed over:
    /// the config file plus every matched input file.
    pub fn fingerprint_inputs(&self) -> Vec<PathBuf> {
        let mut inputs = Vec::with_capacity(self.input_files.len() + 1);
        inputs.push(self.config_path.clone());
        inputs.extend(self.input_files.iter().cloned());
        inputs
    }

    /// Build the concrete command line for this request:
    ///
    /// `<command> <script> <abs config path> <urlencoded JSON options>`
    ///
    /// wrapped in a shell when the platform launcher cannot execute the
    /// script type directly.
    pub fn command_line(&self, bundler: &BundlerSection) -> CommandLine {
        let config_abs = absolutize(&self.base_dir, &self.config_path);

        let args = vec![
            bundler.script.clone(),
            config_abs.to_string_lossy().into_owned(),
            options_argument(self.watch),
        ];

        CommandLine::build(bundler.command.clone(), args)
    }
}

/// A resolved program + argument list, with the original command name
/// kept for diagnostics even when a shell wrapper is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Command name as configured; used in error messages.
    pub command: String,
    /// Program actually handed to the process launcher.
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    fn build(command: String, args: Vec<String>) -> Self {
        if direct_script_execution_supported() {
            Self {
                program: command.clone(),
                command,
                args,
            }
        } else {
            // Route through the platform shell so script execution works
            // where the native launcher resolves executables by extension.
            let mut wrapped = vec!["/C".to_string(), command.clone()];
            wrapped.extend(args);
            Self {
                command,
                program: "cmd".to_string(),
                args: wrapped,
            }
        }
    }
}

/// Whether the native process launcher can execute the bundler command
/// directly. Windows is the common platform where script files need a
/// shell in between; the check is a platform query rather than being
/// hard-coded at call sites so new platforms only touch this function.
fn direct_script_execution_supported() -> bool {
    !cfg!(windows)
}

/// JSON options passed as the last positional argument, URL-encoded so
/// they survive as a single argv entry.
pub fn options_argument(watch: bool) -> String {
    let options = json!({ "watch": watch }).to_string();
    utf8_percent_encode(&options, NON_ALPHANUMERIC).to_string()
}

fn absolutize(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
