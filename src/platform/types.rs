use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UsageEvent;

/// Opaque id of an overlay window, issued by the surface that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayHandle(pub u64);

/// Absolute on-screen rectangle in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Source of foreground transitions, e.g. the OS usage-event log.
pub trait UsageEventSource: Send + Sync {
    /// Events with `begin <= timestamp <= end`, oldest first.
    fn query_events(&self, begin: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<UsageEvent>>;
}

/// Creates and removes blocking windows.
///
/// Implementations are only ever called from the thread that constructed
/// them, so they do not have to be `Send`.
pub trait OverlaySurface {
    fn create(&mut self, placement: &Placement) -> Result<OverlayHandle>;
    fn destroy(&mut self, handle: OverlayHandle) -> Result<()>;
}
