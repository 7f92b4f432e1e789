pub mod foreground;
pub mod region;

pub use foreground::{ForegroundSample, UsageEvent, UsageEventKind};
pub use region::{find_activated, Anchor, HorizontalEdge, MonitoredApp, Region, RegionId, VerticalEdge};
