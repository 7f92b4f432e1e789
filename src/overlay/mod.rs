pub mod dispatcher;
pub mod geometry;
pub mod reconciler;
pub mod surface;

pub use dispatcher::SurfaceDispatcher;
pub use geometry::{place, ScreenMetrics};
pub use reconciler::{ApplyReport, ReconcilePlan, Reconciler};
pub use surface::{execute, OpOutcome, SurfaceOp};
