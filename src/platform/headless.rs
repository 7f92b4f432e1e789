use std::collections::HashMap;

use anyhow::{bail, Result};
use log::info;

use super::{OverlayHandle, OverlaySurface, Placement};

/// Surface that draws nothing and only keeps track of what would be on
/// screen. Used for dry runs of the blocking loop.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    next_handle: u64,
    live: HashMap<OverlayHandle, Placement>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn placement(&self, handle: OverlayHandle) -> Option<Placement> {
        self.live.get(&handle).copied()
    }
}

impl OverlaySurface for HeadlessSurface {
    fn create(&mut self, placement: &Placement) -> Result<OverlayHandle> {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.live.insert(handle, *placement);
        info!(
            "overlay {} at {},{} size {}x{} ({} live)",
            handle.0,
            placement.x,
            placement.y,
            placement.width,
            placement.height,
            self.live.len()
        );
        Ok(handle)
    }

    fn destroy(&mut self, handle: OverlayHandle) -> Result<()> {
        if self.live.remove(&handle).is_none() {
            bail!("unknown overlay handle {}", handle.0);
        }
        info!("overlay {} removed ({} live)", handle.0, self.live.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_destroy_rejects_unknown() {
        let mut surface = HeadlessSurface::new();
        let placement = Placement {
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        };

        let first = surface.create(&placement).unwrap();
        let second = surface.create(&placement).unwrap();
        assert_ne!(first, second);
        assert_eq!(surface.live_count(), 2);

        surface.destroy(first).unwrap();
        assert!(surface.destroy(first).is_err());
        assert_eq!(surface.placement(second), Some(placement));
        assert_eq!(surface.live_count(), 1);
    }
}
