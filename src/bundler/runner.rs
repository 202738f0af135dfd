// src/bundler/runner.rs

//! Bundler process launch and output draining.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::bundler::invocation::InvocationRequest;
use crate::bundler::protocol::OutputDemux;
use crate::config::BundlerSection;
use crate::errors::{PackwatchError, Result};
use crate::types::Mode;

/// Handle to a detached bundler process (the watch variant).
///
/// The child is spawned with `kill_on_drop`, so dropping the handle also
/// terminates the subprocess.
#[derive(Debug)]
pub struct BundlerProcess {
    child: Child,
    command: String,
    mode: Mode,
}

impl BundlerProcess {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// OS pid, while the process has not been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Hard-terminate the process and reap it. Does not wait for any
    /// graceful shutdown.
    pub async fn kill(&mut self) -> Result<()> {
        self.child
            .kill()
            .await
            .with_context(|| format!("killing bundler process '{}'", self.command))?;
        Ok(())
    }
}

/// Run the bundler synchronously and return its decoded result payloads.
///
/// Stdout is demultiplexed line by line (log text to tracing under the
/// `bundler` target, payloads collected); stderr is drained to the error
/// log. Both readers are fully drained before the exit status is
/// classified, so trailing payloads are never lost.
///
/// Fails with [`PackwatchError::CommandNotFound`] when the process cannot
/// be launched and [`PackwatchError::CommandFailed`] on non-zero exit; in
/// the latter case no partial payloads are returned.
pub async fn run(
    request: &InvocationRequest,
    bundler: &BundlerSection,
) -> Result<Vec<serde_json::Value>> {
    let line = request.command_line(bundler);
    info!(
        mode = %request.mode,
        command = %line.command,
        config = %request.config_path.display(),
        "starting bundler run"
    );

    let mut child = launch(request, bundler)?;
    let command = line.command;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_task = tokio::spawn(collect_stdout(stdout));
    let stderr_task = tokio::spawn(drain_stderr(stderr));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for bundler process '{command}'"))?;

    // Join the readers before looking at the exit code: the pipes may
    // still hold buffered lines after the process exits.
    let payloads = stdout_task
        .await
        .context("joining bundler stdout reader")??;
    stderr_task
        .await
        .context("joining bundler stderr reader")?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        warn!(command = %command, exit_code = code, "bundler run failed");
        return Err(PackwatchError::CommandFailed { command, code });
    }

    info!(
        command = %command,
        payloads = payloads.len(),
        "bundler run finished"
    );
    Ok(payloads)
}

/// Launch the bundler detached and return a live handle immediately.
///
/// Output is still drained (log lines via tracing, payloads discarded at
/// debug) so the subprocess never blocks on a full pipe; exit status is
/// not observed here. Used for the watch process.
pub async fn spawn(
    request: &InvocationRequest,
    bundler: &BundlerSection,
) -> Result<BundlerProcess> {
    let line = request.command_line(bundler);
    info!(
        mode = %request.mode,
        command = %line.command,
        "spawning detached bundler process"
    );

    let mut child = launch(request, bundler)?;

    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let reader = BufReader::new(stdout);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match crate::bundler::protocol::split_line(&line) {
                    crate::bundler::protocol::SplitLine::Log(text) => {
                        info!(target: "bundler", "{text}");
                    }
                    crate::bundler::protocol::SplitLine::Tagged { prefix, .. } => {
                        if !prefix.is_empty() {
                            info!(target: "bundler", "{prefix}");
                        }
                        // Payloads are not needed for the detached watcher.
                        debug!(target: "bundler", "discarding result payload");
                    }
                }
            }
            debug!(target: "bundler", "stdout reader ended");
        });
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(drain_stderr(Some(stderr)));
    }

    Ok(BundlerProcess {
        child,
        command: line.command,
        mode: request.mode,
    })
}

fn launch(request: &InvocationRequest, bundler: &BundlerSection) -> Result<Child> {
    let line = request.command_line(bundler);

    let mut cmd = Command::new(&line.program);
    cmd.args(&line.args)
        .current_dir(&request.base_dir)
        .envs(&request.env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(
        program = %line.program,
        args = ?line.args,
        cwd = %request.base_dir.display(),
        "launching bundler"
    );

    cmd.spawn().map_err(|source| PackwatchError::CommandNotFound {
        command: line.command,
        source,
    })
}

async fn collect_stdout(stdout: Option<ChildStdout>) -> Result<Vec<serde_json::Value>> {
    let Some(stdout) = stdout else {
        return Ok(Vec::new());
    };

    let mut demux = OutputDemux::new(|text: &str| info!(target: "bundler", "{text}"));

    let reader = BufReader::new(stdout);
    let mut lines = reader.lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("reading bundler stdout")?
    {
        demux.accept(&line)?;
    }

    Ok(demux.into_payloads())
}

async fn drain_stderr(stderr: Option<ChildStderr>) {
    let Some(stderr) = stderr else { return };

    let reader = BufReader::new(stderr);
    let mut lines = reader.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!(target: "bundler", "stderr: {line}");
    }
}
