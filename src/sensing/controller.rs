use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::overlay::SurfaceDispatcher;
use crate::platform::UsageEventSource;
use crate::regions::SnapshotReader;
use crate::settings::BlockerSettings;

use super::loop_worker::{blocking_loop, LoopContext};
use super::sampler::ForegroundSampler;

/// Owns the blocking loop: at most one loop runs per service, and stopping
/// it waits until every overlay has been taken down.
pub struct BlockerService {
    settings: BlockerSettings,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl BlockerService {
    pub fn new(settings: BlockerSettings) -> Self {
        Self {
            settings,
            handle: None,
            cancel_token: None,
        }
    }

    /// Spawns the loop on the current tokio runtime.
    pub fn start(
        &mut self,
        source: Arc<dyn UsageEventSource>,
        snapshots: SnapshotReader,
        dispatcher: SurfaceDispatcher,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("blocking loop already active");
        }

        let cancel_token = CancellationToken::new();
        let ctx = LoopContext {
            sampler: Arc::new(ForegroundSampler::new(source, self.settings.sample_window)),
            snapshots,
            dispatcher,
            settings: self.settings.clone(),
        };

        let handle = tokio::spawn(blocking_loop(ctx, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        info!("Blocker service started");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Clears the liveness flag without waiting. The loop finishes its
    /// current tick, drains the overlays and exits.
    pub fn request_stop(&self) {
        if let Some(token) = &self.cancel_token {
            token.cancel();
            info!("Stop requested for blocking loop");
        }
    }

    /// Stops the loop and waits until it has drained.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("blocking loop task failed to join")?;
            info!("Blocker service stopped");
        }
        Ok(())
    }
}
