use serde::{Deserialize, Serialize};

pub type RegionId = i64;

/// Reference point a region's offsets are measured from.
///
/// Serialized with the upper-case names the region store uses on disk
/// (`TOPLEFT`, `BOTTOM`, ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Anchor {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalEdge {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalEdge {
    Top,
    Center,
    Bottom,
}

impl Anchor {
    pub const ALL: [Anchor; 8] = [
        Anchor::TopLeft,
        Anchor::Top,
        Anchor::TopRight,
        Anchor::Right,
        Anchor::BottomRight,
        Anchor::Bottom,
        Anchor::BottomLeft,
        Anchor::Left,
    ];

    pub fn horizontal(self) -> HorizontalEdge {
        match self {
            Anchor::TopLeft | Anchor::Left | Anchor::BottomLeft => HorizontalEdge::Left,
            Anchor::Top | Anchor::Bottom => HorizontalEdge::Center,
            Anchor::TopRight | Anchor::Right | Anchor::BottomRight => HorizontalEdge::Right,
        }
    }

    pub fn vertical(self) -> VerticalEdge {
        match self {
            Anchor::TopLeft | Anchor::Top | Anchor::TopRight => VerticalEdge::Top,
            Anchor::Left | Anchor::Right => VerticalEdge::Center,
            Anchor::BottomLeft | Anchor::Bottom | Anchor::BottomRight => VerticalEdge::Bottom,
        }
    }
}

/// A rectangular area to block while its owning app is in the foreground.
///
/// Offsets and sizes are in density-independent units; offsets may be
/// negative and are not validated here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub region_id: RegionId,
    pub app_id: String,
    pub anchor: Anchor,
    pub x_offset: i32,
    pub y_offset: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredApp {
    pub app_id: String,
    #[serde(default)]
    pub name: String,
    pub activated: bool,
    #[serde(default)]
    pub regions: Vec<Region>,
}

/// First activated app in `apps` whose id is `app_id`.
pub fn find_activated<'a>(apps: &'a [MonitoredApp], app_id: &str) -> Option<&'a MonitoredApp> {
    apps.iter().find(|app| app.activated && app.app_id == app_id)
}
