pub mod error;
pub mod models;
pub mod overlay;
pub mod platform;
pub mod regions;
pub mod sensing;
pub mod settings;
#[cfg(test)]
mod test_utils;
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use directories::ProjectDirs;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use overlay::SurfaceDispatcher;
use platform::{HeadlessSurface, ReplayEventSource};
use regions::{snapshot_channel, spawn_reload_watcher, RegionStore};
use sensing::BlockerService;
use settings::BlockerSettings;

fn default_regions_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "tapguard", "TapGuard")
        .ok_or_else(|| anyhow!("could not determine a data directory"))?;
    Ok(dirs.data_dir().join("regions.json"))
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key).map(PathBuf::from)
}

/// Runs the blocker headless: foreground switches are replayed from
/// `TAPGUARD_REPLAY` and overlays are tracked without being drawn.
pub fn run() -> Result<()> {
    utils::logging::init();
    info!("TapGuard starting up...");

    let settings = BlockerSettings::from_env();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("tapguard-rt")
        .build()
        .context("failed to build tokio runtime")?;

    let result = runtime.block_on(serve(settings));
    if let Err(err) = &result {
        error!("TapGuard stopped with an error: {err:#}");
    }
    result
}

async fn serve(settings: BlockerSettings) -> Result<()> {
    let regions_path = match env_path("TAPGUARD_REGIONS") {
        Some(path) => path,
        None => default_regions_path()?,
    };
    let replay_path = env_path("TAPGUARD_REPLAY")
        .ok_or_else(|| anyhow!("TAPGUARD_REPLAY must point to a recorded foreground script"))?;

    let (publisher, snapshots) = snapshot_channel();
    let store = Arc::new(RegionStore::open(regions_path, publisher)?);

    let watcher_token = CancellationToken::new();
    let watcher = spawn_reload_watcher(
        Arc::clone(&store),
        settings.config_poll_interval,
        watcher_token.clone(),
    );

    let source = Arc::new(ReplayEventSource::from_file(&replay_path, Utc::now())?);
    let dispatcher = SurfaceDispatcher::spawn(|| Ok(HeadlessSurface::new()))?;

    let mut service = BlockerService::new(settings);
    service.start(source, snapshots, dispatcher)?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("Shutdown requested");

    service.stop().await?;
    watcher_token.cancel();
    watcher.await.context("region watcher failed to join")?;

    info!("TapGuard stopped");
    Ok(())
}
