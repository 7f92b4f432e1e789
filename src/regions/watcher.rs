use std::sync::Arc;

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::store::{file_stamp, RegionStore};

/// Polls the store's file and reloads it whenever its modification time
/// or length moves away from what the store last saw. Runs until `cancel_token`
/// fires.
pub fn spawn_reload_watcher(
    store: Arc<RegionStore>,
    poll_interval: Duration,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let store = Arc::clone(&store);
                    let result = tokio::task::spawn_blocking(move || {
                        let on_disk = file_stamp(store.path());
                        if on_disk.is_some() && on_disk != store.loaded_stamp() {
                            store.reload().map(|()| true)
                        } else {
                            Ok(false)
                        }
                    })
                    .await;

                    match result {
                        Ok(Ok(_)) => {}
                        Ok(Err(err)) => warn!("region config reload failed: {err:#}"),
                        Err(err) => warn!("region config reload worker failed: {err}"),
                    }
                }
                _ = cancel_token.cancelled() => {
                    info!("region config watcher shutting down");
                    break;
                }
            }
        }
    })
}
