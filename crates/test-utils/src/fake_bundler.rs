#![allow(dead_code)]

//! Fake bundler scripts for process-level tests.
//!
//! Generates a small `sh` script that plays the role of the bundler
//! driver: it appends an invocation marker (so tests can count runs),
//! prints scripted stdout/stderr lines (optionally carrying a sentinel
//! payload) and exits with a fixed code. Tests configure
//! `command = "sh"` and point `script` at the generated file; the config
//! and options arguments the real driver would receive are ignored.

use std::fs;
use std::path::{Path, PathBuf};

/// The reserved control character, mirrored here so scripts can embed it.
pub const SENTINEL: char = '\u{10}';

enum ScriptLine {
    Stdout(String),
    Stderr(String),
}

/// Builder for a fake bundler script.
pub struct FakeBundler {
    lines: Vec<ScriptLine>,
    exit_code: i32,
    marker: Option<PathBuf>,
    sleep_secs: Option<u64>,
}

impl FakeBundler {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            exit_code: 0,
            marker: None,
            sleep_secs: None,
        }
    }

    /// Print a plain log line on stdout.
    pub fn log(mut self, text: &str) -> Self {
        self.lines.push(ScriptLine::Stdout(text.to_string()));
        self
    }

    /// Print a line carrying only a payload (empty log prefix).
    pub fn payload(self, json: &str) -> Self {
        self.tagged("", json)
    }

    /// Print a line with a log prefix followed by the sentinel and a payload.
    pub fn tagged(mut self, prefix: &str, json: &str) -> Self {
        self.lines
            .push(ScriptLine::Stdout(format!("{prefix}{SENTINEL}{json}")));
        self
    }

    /// Print a line on stderr.
    pub fn stderr(mut self, text: &str) -> Self {
        self.lines.push(ScriptLine::Stderr(text.to_string()));
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Append one line to `path` per invocation, so tests can count how
    /// often the bundler actually ran.
    pub fn marker(mut self, path: &Path) -> Self {
        self.marker = Some(path.to_path_buf());
        self
    }

    /// Sleep before exiting; stands in for a long-lived watch process.
    pub fn sleep(mut self, secs: u64) -> Self {
        self.sleep_secs = Some(secs);
        self
    }

    /// Write the script to `path` (and mark it executable on unix).
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let mut script = String::from("#!/bin/sh\n");

        if let Some(marker) = &self.marker {
            script.push_str(&format!(
                "echo run >> {}\n",
                sh_quote(&marker.to_string_lossy())
            ));
        }
        for line in &self.lines {
            match line {
                ScriptLine::Stdout(text) => {
                    script.push_str(&format!("printf '%s\\n' {}\n", sh_quote(text)));
                }
                ScriptLine::Stderr(text) => {
                    script.push_str(&format!("printf '%s\\n' {} >&2\n", sh_quote(text)));
                }
            }
        }
        if let Some(secs) = self.sleep_secs {
            script.push_str(&format!("sleep {secs}\n"));
        }
        script.push_str(&format!("exit {}\n", self.exit_code));

        fs::write(path, script)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
        }

        Ok(())
    }
}

impl Default for FakeBundler {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-quote a string for `sh`, escaping embedded single quotes.
fn sh_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "'\\''"))
}
