use crate::error::BlockerError;
use crate::models::RegionId;
use crate::platform::{OverlayHandle, OverlaySurface, Placement};

/// A single change to apply on the surface thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Show {
        region_id: RegionId,
        placement: Placement,
    },
    Hide {
        region_id: RegionId,
        handle: OverlayHandle,
    },
}

impl SurfaceOp {
    pub fn region_id(&self) -> RegionId {
        match self {
            SurfaceOp::Show { region_id, .. } | SurfaceOp::Hide { region_id, .. } => *region_id,
        }
    }
}

/// Result of one [`SurfaceOp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    Shown {
        region_id: RegionId,
        result: Result<OverlayHandle, BlockerError>,
    },
    Hidden {
        region_id: RegionId,
        result: Result<(), BlockerError>,
    },
}

impl OpOutcome {
    /// Outcome for an op that never reached the surface.
    pub fn failed(op: &SurfaceOp, reason: &str) -> Self {
        match *op {
            SurfaceOp::Show { region_id, .. } => OpOutcome::Shown {
                region_id,
                result: Err(BlockerError::OverlayCreateFailed {
                    region_id,
                    reason: reason.to_string(),
                }),
            },
            SurfaceOp::Hide { region_id, .. } => OpOutcome::Hidden {
                region_id,
                result: Err(BlockerError::OverlayDestroyFailed {
                    region_id,
                    reason: reason.to_string(),
                }),
            },
        }
    }
}

/// Runs `ops` in order against `surface`. Every op produces exactly one
/// outcome; a failing op does not stop the rest of the batch.
pub fn execute(surface: &mut dyn OverlaySurface, ops: Vec<SurfaceOp>) -> Vec<OpOutcome> {
    ops.into_iter()
        .map(|op| match op {
            SurfaceOp::Show {
                region_id,
                placement,
            } => OpOutcome::Shown {
                region_id,
                result: surface.create(&placement).map_err(|err| {
                    BlockerError::OverlayCreateFailed {
                        region_id,
                        reason: format!("{err:#}"),
                    }
                }),
            },
            SurfaceOp::Hide { region_id, handle } => OpOutcome::Hidden {
                region_id,
                result: surface.destroy(handle).map_err(|err| {
                    BlockerError::OverlayDestroyFailed {
                        region_id,
                        reason: format!("{err:#}"),
                    }
                }),
            },
        })
        .collect()
}
