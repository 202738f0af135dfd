// src/bundler/protocol.rs

//! Sentinel-byte demultiplexing of bundler stdout.
//!
//! The bundler writes ordinary log lines to stdout, but may append to any
//! line a single `0x10` control byte followed by a JSON payload occupying
//! the remainder of the line. For each line:
//!
//! 1. If the sentinel is absent, the whole line is log text.
//! 2. If present, the text before it (when non-empty) is log text and the
//!    text after it is decoded as JSON.
//!
//! The protocol assumes the bundler never emits `0x10` in legitimate log
//! text; that assumption is unverified, so the first occurrence wins and
//! anything after it is treated as payload. A malformed payload fails the
//! whole invocation rather than being dropped, so callers can trust that
//! an empty result list means "no payload emitted".

use serde_json::Value;

use crate::errors::{PackwatchError, Result};

/// Reserved control character separating log text from a trailing
/// machine-readable payload.
pub const RESULT_SENTINEL: char = '\u{10}';

/// One stdout line, split at the first sentinel occurrence.
#[derive(Debug, PartialEq, Eq)]
pub enum SplitLine<'a> {
    /// No sentinel present; the whole line is log text.
    Log(&'a str),
    /// Sentinel present: `prefix` is log text (possibly empty), `payload`
    /// is the undecoded remainder.
    Tagged { prefix: &'a str, payload: &'a str },
}

/// Split a line at the first sentinel byte, if any.
pub fn split_line(line: &str) -> SplitLine<'_> {
    match line.find(RESULT_SENTINEL) {
        None => SplitLine::Log(line),
        Some(idx) => SplitLine::Tagged {
            prefix: &line[..idx],
            payload: &line[idx + RESULT_SENTINEL.len_utf8()..],
        },
    }
}

/// Streaming demultiplexer: feeds log text to a sink and accumulates
/// decoded payloads.
///
/// The sink is any `FnMut(&str)`; production code passes a closure that
/// logs under the `bundler` tracing target, tests pass a recording
/// closure.
#[derive(Debug)]
pub struct OutputDemux<F: FnMut(&str)> {
    sink: F,
    payloads: Vec<Value>,
}

impl<F: FnMut(&str)> OutputDemux<F> {
    pub fn new(sink: F) -> Self {
        Self {
            sink,
            payloads: Vec::new(),
        }
    }

    /// Process one stdout line.
    ///
    /// Log text is forwarded to the sink in arrival order, before any
    /// payload on the same line is decoded. A payload that fails to parse
    /// as JSON is an invocation failure ([`PackwatchError::PayloadDecode`]).
    pub fn accept(&mut self, line: &str) -> Result<()> {
        match split_line(line) {
            SplitLine::Log(text) => (self.sink)(text),
            SplitLine::Tagged { prefix, payload } => {
                if !prefix.is_empty() {
                    (self.sink)(prefix);
                }
                let value: Value =
                    serde_json::from_str(payload).map_err(|source| PackwatchError::PayloadDecode {
                        line: line.to_string(),
                        source,
                    })?;
                self.payloads.push(value);
            }
        }
        Ok(())
    }

    /// Payloads decoded so far, in emission order.
    pub fn into_payloads(self) -> Vec<Value> {
        self.payloads
    }
}
