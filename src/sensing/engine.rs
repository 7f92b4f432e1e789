use log::{debug, info, warn};

use crate::error::BlockerError;
use crate::models::{ForegroundSample, MonitoredApp};
use crate::overlay::{execute, ApplyReport, OpOutcome, ReconcilePlan, Reconciler, ScreenMetrics, SurfaceOp};
use crate::platform::OverlaySurface;
use crate::settings::SampleFailurePolicy;

use super::tracker::ForegroundTracker;

const LOG_TICKS: bool = true;

use crate::{tick_debug, tick_info};

/// Per-tick composition of the tracker and the reconciler.
///
/// A tick is split in two so the surface work can run on another thread:
/// [`BlockerEngine::begin_tick`] turns a sample and the latest snapshot into
/// surface operations, [`BlockerEngine::finish_tick`] records their outcome.
#[derive(Debug)]
pub struct BlockerEngine {
    tracker: ForegroundTracker,
    reconciler: Reconciler,
    on_sample_failure: SampleFailurePolicy,
    config_missing: bool,
}

impl BlockerEngine {
    pub fn new(screen: ScreenMetrics, on_sample_failure: SampleFailurePolicy) -> Self {
        Self {
            tracker: ForegroundTracker::new(),
            reconciler: Reconciler::new(screen),
            on_sample_failure,
            config_missing: false,
        }
    }

    pub fn begin_tick(
        &mut self,
        sample: Result<ForegroundSample, BlockerError>,
        snapshot: Option<&[MonitoredApp]>,
    ) -> (ReconcilePlan, Vec<SurfaceOp>) {
        let apps: &[MonitoredApp] = match snapshot {
            Some(apps) => {
                if self.config_missing {
                    info!("region config snapshot received");
                    self.config_missing = false;
                }
                apps
            }
            None => {
                if !self.config_missing {
                    debug!("{}; blocking nothing until one arrives", BlockerError::ConfigUnavailable);
                    self.config_missing = true;
                }
                &[]
            }
        };

        let sample = match sample {
            Ok(sample) => sample,
            Err(err) => {
                warn!("{err}");
                if self.on_sample_failure == SampleFailurePolicy::ClearForeground {
                    self.tracker.clear();
                }
                ForegroundSample::Quiet
            }
        };

        let effective_app = self.tracker.observe(&sample, apps);
        tick_debug!(
            "sampled {:?}, effective foreground {:?}",
            sample.app_id(),
            effective_app
        );

        let plan = self.reconciler.plan(effective_app, apps);
        let ops = self.reconciler.operations(&plan);
        if !plan.is_empty() {
            tick_info!(
                "foreground {:?}: showing {} and hiding {} regions",
                effective_app,
                plan.to_add.len(),
                plan.to_remove.len()
            );
        }
        (plan, ops)
    }

    pub fn finish_tick(&mut self, outcomes: Vec<OpOutcome>) -> ApplyReport {
        self.reconciler.record(outcomes)
    }

    /// Runs a whole tick against a surface owned by the calling thread.
    pub fn run_tick(
        &mut self,
        sample: Result<ForegroundSample, BlockerError>,
        snapshot: Option<&[MonitoredApp]>,
        surface: &mut dyn OverlaySurface,
    ) -> ApplyReport {
        let (_, ops) = self.begin_tick(sample, snapshot);
        let outcomes = execute(surface, ops);
        self.finish_tick(outcomes)
    }

    /// Operations taking every overlay down.
    pub fn shutdown_operations(&self) -> Vec<SurfaceOp> {
        self.reconciler.drain_operations()
    }

    /// Back to the initial state. Overlays should be drained first.
    pub fn reset(&mut self) {
        self.tracker.clear();
        self.config_missing = false;
        if self.reconciler.displayed_count() > 0 {
            warn!(
                "resetting with {} overlays still recorded as shown",
                self.reconciler.displayed_count()
            );
        }
    }

    pub fn effective_app(&self) -> Option<&str> {
        self.tracker.effective_app()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
}
