pub mod feed;
pub mod store;
pub mod watcher;

pub use feed::{snapshot_channel, AppsSnapshot, SnapshotPublisher, SnapshotReader};
pub use store::{FileStamp, RegionDraft, RegionStore};
pub use watcher::spawn_reload_watcher;
