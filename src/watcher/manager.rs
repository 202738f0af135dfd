// src/watcher/manager.rs

use tracing::{debug, info};

use crate::bundler::invocation::InvocationRequest;
use crate::bundler::runner::{self, BundlerProcess};
use crate::config::BundlerSection;
use crate::errors::Result;
use crate::types::Mode;

/// Lifecycle manager for the single long-running watch subprocess.
///
/// Two states: idle (no active watcher) and running (holding one live
/// [`BundlerProcess`]). `start` always stops the previous watcher before
/// spawning the new one, so at most one watcher subprocess is alive at
/// any time, even across rapid repeated starts. The manager is owned by
/// the host's `Session` and `start`/`stop` are its only mutators.
///
/// A watcher that crashes on its own is not detected here; the slot
/// stays occupied until the next `start` or `stop`. Whether a crashed
/// watcher should auto-restart is deliberately left open.
#[derive(Debug, Default)]
pub struct WatchManager {
    active: Option<BundlerProcess>,
}

impl WatchManager {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Mode of the active watcher, if any.
    pub fn active_mode(&self) -> Option<Mode> {
        self.active.as_ref().map(|p| p.mode())
    }

    /// OS pid of the active watcher, if any.
    pub fn active_id(&self) -> Option<u32> {
        self.active.as_ref().and_then(|p| p.id())
    }

    /// Start a watch process for the given request, replacing any
    /// currently running one.
    ///
    /// The previous process is terminated and reaped before the new one
    /// is spawned; the two are never alive concurrently.
    pub async fn start(
        &mut self,
        request: &InvocationRequest,
        bundler: &BundlerSection,
    ) -> Result<()> {
        self.stop().await?;

        let process = runner::spawn(request, bundler).await?;
        info!(
            mode = %process.mode(),
            pid = process.id(),
            "watch process started"
        );
        self.active = Some(process);
        Ok(())
    }

    /// Terminate the active watch process, if any. No-op when idle.
    ///
    /// Termination is a hard kill; the bundler gets no graceful-shutdown
    /// window. The child is reaped so its pid is released.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(mut process) = self.active.take() else {
            debug!("no watch process running; stop is a no-op");
            return Ok(());
        };

        info!(
            mode = %process.mode(),
            pid = process.id(),
            "stopping watch process"
        );
        process.kill().await?;
        Ok(())
    }
}
