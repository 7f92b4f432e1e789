use thiserror::Error;

use crate::models::RegionId;

/// Failures the blocking loop can observe. None of them stop the loop.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlockerError {
    #[error("foreground sample unavailable: {0}")]
    SampleUnavailable(String),

    #[error("overlay for region {region_id} could not be created: {reason}")]
    OverlayCreateFailed { region_id: RegionId, reason: String },

    #[error("overlay for region {region_id} could not be destroyed: {reason}")]
    OverlayDestroyFailed { region_id: RegionId, reason: String },

    #[error("no region config snapshot received yet")]
    ConfigUnavailable,

    #[error("overlay surface unavailable: {0}")]
    SurfaceUnavailable(String),
}
