pub mod headless;
pub mod replay;
pub mod types;

pub use headless::HeadlessSurface;
pub use replay::{ReplayEventSource, ScriptedSwitch};
pub use types::{OverlayHandle, OverlaySurface, Placement, UsageEventSource};
