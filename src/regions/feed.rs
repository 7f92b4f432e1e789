use std::sync::Arc;

use tokio::sync::watch;

use crate::models::MonitoredApp;

pub type AppsSnapshot = Arc<Vec<MonitoredApp>>;

/// Creates the single-slot cell the region store publishes into and the
/// blocking loop reads from. Only the latest snapshot is kept.
pub fn snapshot_channel() -> (SnapshotPublisher, SnapshotReader) {
    let (tx, rx) = watch::channel(None);
    (
        SnapshotPublisher { tx: Arc::new(tx) },
        SnapshotReader { rx },
    )
}

#[derive(Clone)]
pub struct SnapshotPublisher {
    tx: Arc<watch::Sender<Option<AppsSnapshot>>>,
}

impl SnapshotPublisher {
    /// Replaces the current snapshot. Never waits on readers and succeeds
    /// even when nobody is listening.
    pub fn publish(&self, apps: Vec<MonitoredApp>) {
        self.tx.send_replace(Some(Arc::new(apps)));
    }

    pub fn subscribe(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Option<AppsSnapshot>>,
}

impl SnapshotReader {
    /// Most recently published snapshot, or `None` before the first publish.
    pub fn latest(&self) -> Option<AppsSnapshot> {
        self.rx.borrow().clone()
    }
}
