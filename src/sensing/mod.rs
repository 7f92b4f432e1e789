pub mod controller;
pub mod engine;
pub mod loop_worker;
pub mod sampler;
pub mod tracker;

pub use controller::BlockerService;
pub use engine::BlockerEngine;
pub use sampler::ForegroundSampler;
pub use tracker::ForegroundTracker;
