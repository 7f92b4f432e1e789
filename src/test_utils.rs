//! Shared fakes for the blocker's unit tests.

#![cfg(test)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};

use crate::models::{Anchor, MonitoredApp, Region, RegionId, UsageEvent};
use crate::platform::{OverlayHandle, OverlaySurface, Placement, UsageEventSource};

/// In-memory surface with failure injection.
#[derive(Debug, Default)]
pub struct FakeSurface {
    next_handle: u64,
    live: HashMap<OverlayHandle, Placement>,
    fail_creates: usize,
    fail_destroys: usize,
    pub created: Vec<Placement>,
    pub destroyed: Vec<OverlayHandle>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_creates(&mut self, count: usize) {
        self.fail_creates = count;
    }

    pub fn fail_next_destroys(&mut self, count: usize) {
        self.fail_destroys = count;
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl OverlaySurface for FakeSurface {
    fn create(&mut self, placement: &Placement) -> Result<OverlayHandle> {
        if self.fail_creates > 0 {
            self.fail_creates -= 1;
            bail!("window manager rejected overlay");
        }
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.live.insert(handle, *placement);
        self.created.push(*placement);
        Ok(handle)
    }

    fn destroy(&mut self, handle: OverlayHandle) -> Result<()> {
        if self.fail_destroys > 0 {
            self.fail_destroys -= 1;
            bail!("view not attached");
        }
        self.live
            .remove(&handle)
            .ok_or_else(|| anyhow!("unknown handle {}", handle.0))?;
        self.destroyed.push(handle);
        Ok(())
    }
}

/// [`FakeSurface`] that stays inspectable after being moved onto the
/// surface thread.
#[derive(Debug, Clone, Default)]
pub struct SharedSurface {
    inner: Arc<Mutex<FakeSurface>>,
}

impl SharedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.inner.lock().unwrap().live_count()
    }

    pub fn created_count(&self) -> usize {
        self.inner.lock().unwrap().created.len()
    }
}

impl OverlaySurface for SharedSurface {
    fn create(&mut self, placement: &Placement) -> Result<OverlayHandle> {
        self.inner.lock().unwrap().create(placement)
    }

    fn destroy(&mut self, handle: OverlayHandle) -> Result<()> {
        self.inner.lock().unwrap().destroy(handle)
    }
}

/// Event source answering each query with the next queued response; once
/// the queue is empty every query sees no events.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<UsageEvent>>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_events(&self, events: Vec<UsageEvent>) {
        self.responses.lock().unwrap().push_back(Ok(events));
    }

    pub fn push_failure(&self, reason: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(anyhow!(reason.to_string())));
    }
}

impl UsageEventSource for ScriptedSource {
    fn query_events(&self, _begin: DateTime<Utc>, _end: DateTime<Utc>) -> Result<Vec<UsageEvent>> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn region(region_id: RegionId, app_id: &str) -> Region {
    Region {
        region_id,
        app_id: app_id.to_string(),
        anchor: Anchor::Bottom,
        x_offset: 0,
        y_offset: 0,
        width: 100,
        height: 50,
    }
}

pub fn app(app_id: &str, activated: bool, region_ids: &[RegionId]) -> MonitoredApp {
    MonitoredApp {
        app_id: app_id.to_string(),
        name: app_id.to_string(),
        activated,
        regions: region_ids.iter().map(|id| region(*id, app_id)).collect(),
    }
}
