use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::SystemTime,
};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::models::{Anchor, MonitoredApp, Region, RegionId};

use super::feed::SnapshotPublisher;

/// A region as submitted by an editor. `region_id` is kept when present so
/// an edited region stays on screen without being recreated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDraft {
    #[serde(default)]
    pub region_id: Option<RegionId>,
    pub anchor: Anchor,
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionFile {
    next_region_id: RegionId,
    apps: Vec<MonitoredApp>,
}

impl Default for RegionFile {
    fn default() -> Self {
        Self {
            next_region_id: 1,
            apps: Vec::new(),
        }
    }
}

impl RegionFile {
    fn allocate_id(&mut self) -> RegionId {
        let id = self.next_region_id;
        self.next_region_id += 1;
        id
    }

    /// Keeps the id counter ahead of every id already on disk.
    fn normalize(&mut self) {
        let highest = self
            .apps
            .iter()
            .flat_map(|app| app.regions.iter())
            .map(|region| region.region_id)
            .max()
            .unwrap_or(0);
        self.next_region_id = self.next_region_id.max(highest + 1);
    }
}

/// What the watcher compares to spot an edit made outside the store.
/// The length catches edits that land within the same mtime tick as the
/// store's own write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub modified: SystemTime,
    pub len: u64,
}

/// JSON-file store of monitored apps and their regions.
///
/// Every mutation is written to disk and then published as a fresh snapshot.
pub struct RegionStore {
    path: PathBuf,
    data: RwLock<RegionFile>,
    loaded_stamp: Mutex<Option<FileStamp>>,
    publisher: SnapshotPublisher,
}

impl RegionStore {
    pub fn open(path: PathBuf, publisher: SnapshotPublisher) -> Result<Self> {
        let data = read_file(&path)?;

        let store = Self {
            loaded_stamp: Mutex::new(file_stamp(&path)),
            path,
            data: RwLock::new(data),
            publisher,
        };

        info!(
            "Loaded {} monitored apps from {}",
            store.read().apps.len(),
            store.path.display()
        );
        store.publish();
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn apps(&self) -> Vec<MonitoredApp> {
        self.read().apps.clone()
    }

    /// Inserts or replaces `app_id` together with its full region list.
    /// Returns the ids of the saved regions in draft order.
    pub fn save_app(
        &self,
        app_id: &str,
        name: &str,
        activated: bool,
        drafts: Vec<RegionDraft>,
    ) -> Result<Vec<RegionId>> {
        let ids = {
            let mut guard = self.write();

            let regions: Vec<Region> = drafts
                .into_iter()
                .map(|draft| Region {
                    region_id: draft.region_id.unwrap_or_else(|| guard.allocate_id()),
                    app_id: app_id.to_string(),
                    anchor: draft.anchor,
                    x_offset: draft.x_offset,
                    y_offset: draft.y_offset,
                    width: draft.width,
                    height: draft.height,
                })
                .collect();
            let ids = regions.iter().map(|region| region.region_id).collect();

            let app = MonitoredApp {
                app_id: app_id.to_string(),
                name: name.to_string(),
                activated,
                regions,
            };
            match guard.apps.iter_mut().find(|existing| existing.app_id == app_id) {
                Some(existing) => *existing = app,
                None => guard.apps.push(app),
            }
            guard.normalize();

            self.persist(&guard)?;
            ids
        };

        self.publish();
        Ok(ids)
    }

    /// Returns `false` when `app_id` is not stored.
    pub fn set_activated(&self, app_id: &str, activated: bool) -> Result<bool> {
        {
            let mut guard = self.write();
            let Some(app) = guard.apps.iter_mut().find(|app| app.app_id == app_id) else {
                return Ok(false);
            };
            app.activated = activated;
            self.persist(&guard)?;
        }

        self.publish();
        Ok(true)
    }

    /// Removes the app and every region it owns. Returns `false` when
    /// `app_id` is not stored.
    pub fn delete_app(&self, app_id: &str) -> Result<bool> {
        {
            let mut guard = self.write();
            let before = guard.apps.len();
            guard.apps.retain(|app| app.app_id != app_id);
            if guard.apps.len() == before {
                return Ok(false);
            }
            self.persist(&guard)?;
        }

        self.publish();
        Ok(true)
    }

    /// Re-reads the file, e.g. after another process edited it.
    pub fn reload(&self) -> Result<()> {
        let data = read_file(&self.path)?;
        {
            let mut guard = self.write();
            *guard = data;
        }
        *self.loaded_guard() = file_stamp(&self.path);

        info!("Reloaded region config from {}", self.path.display());
        self.publish();
        Ok(())
    }

    /// Stamp of the file as of the last load or write.
    pub fn loaded_stamp(&self) -> Option<FileStamp> {
        *self.loaded_guard()
    }

    fn publish(&self) {
        self.publisher.publish(self.apps());
    }

    fn persist(&self, data: &RegionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write region config to {}", self.path.display()))?;
        *self.loaded_guard() = file_stamp(&self.path);
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, RegionFile> {
        self.data.read().unwrap_or_else(|poisoned| {
            warn!("Region store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegionFile> {
        self.data.write().unwrap_or_else(|poisoned| {
            warn!("Region store lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn loaded_guard(&self) -> MutexGuard<'_, Option<FileStamp>> {
        self.loaded_stamp
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_file(path: &Path) -> Result<RegionFile> {
    if !path.exists() {
        return Ok(RegionFile::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read region config from {}", path.display()))?;
    let mut data: RegionFile = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid region config in {}", path.display()))?;
    data.normalize();
    Ok(data)
}

pub(crate) fn file_stamp(path: &Path) -> Option<FileStamp> {
    let meta = fs::metadata(path).ok()?;
    Some(FileStamp {
        modified: meta.modified().ok()?,
        len: meta.len(),
    })
}
