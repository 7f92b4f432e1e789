use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::models::{find_activated, MonitoredApp, Region, RegionId};
use crate::platform::{OverlayHandle, OverlaySurface};

use super::geometry::{place, ScreenMetrics};
use super::surface::{execute, OpOutcome, SurfaceOp};

/// Difference between what is on screen and what should be.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_add: Vec<Region>,
    pub to_remove: Vec<RegionId>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// What happened when a batch of outcomes was recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub shown: Vec<RegionId>,
    pub hidden: Vec<RegionId>,
    pub failed_shows: Vec<RegionId>,
    pub failed_hides: Vec<RegionId>,
}

/// Owns the table of overlays currently on screen and converges it towards
/// the regions of the effective foreground app.
///
/// Each region is either hidden (no entry) or shown (entry with handle).
/// Regions that stay targeted are never recreated.
#[derive(Debug)]
pub struct Reconciler {
    displayed: HashMap<RegionId, OverlayHandle>,
    metrics: ScreenMetrics,
}

impl Reconciler {
    pub fn new(metrics: ScreenMetrics) -> Self {
        Self {
            displayed: HashMap::new(),
            metrics,
        }
    }

    pub fn plan(&self, effective_app: Option<&str>, apps: &[MonitoredApp]) -> ReconcilePlan {
        let target: &[Region] = effective_app
            .and_then(|app_id| find_activated(apps, app_id))
            .map(|app| app.regions.as_slice())
            .unwrap_or(&[]);

        let target_ids: HashSet<RegionId> = target.iter().map(|region| region.region_id).collect();

        let mut to_remove: Vec<RegionId> = self
            .displayed
            .keys()
            .filter(|id| !target_ids.contains(id))
            .copied()
            .collect();
        to_remove.sort_unstable();

        let mut queued = HashSet::new();
        let to_add = target
            .iter()
            .filter(|region| !self.displayed.contains_key(&region.region_id))
            .filter(|region| queued.insert(region.region_id))
            .cloned()
            .collect();

        ReconcilePlan { to_add, to_remove }
    }

    /// Surface operations for `plan`, removals first.
    pub fn operations(&self, plan: &ReconcilePlan) -> Vec<SurfaceOp> {
        let hides = plan.to_remove.iter().filter_map(|region_id| {
            self.displayed.get(region_id).map(|handle| SurfaceOp::Hide {
                region_id: *region_id,
                handle: *handle,
            })
        });
        let shows = plan.to_add.iter().map(|region| SurfaceOp::Show {
            region_id: region.region_id,
            placement: place(region, &self.metrics),
        });

        hides.chain(shows).collect()
    }

    /// Operations removing every overlay on screen.
    pub fn drain_operations(&self) -> Vec<SurfaceOp> {
        let mut ops: Vec<SurfaceOp> = self
            .displayed
            .iter()
            .map(|(region_id, handle)| SurfaceOp::Hide {
                region_id: *region_id,
                handle: *handle,
            })
            .collect();
        ops.sort_by_key(SurfaceOp::region_id);
        ops
    }

    /// Folds surface outcomes into the table. Failed shows leave the region
    /// hidden so the next tick retries; failed hides still drop the entry.
    pub fn record(&mut self, outcomes: Vec<OpOutcome>) -> ApplyReport {
        let mut report = ApplyReport::default();

        for outcome in outcomes {
            match outcome {
                OpOutcome::Shown {
                    region_id,
                    result: Ok(handle),
                } => {
                    if let Some(stale) = self.displayed.insert(region_id, handle) {
                        warn!("region {region_id} was already shown as overlay {}", stale.0);
                    }
                    debug!("region {region_id} shown as overlay {}", handle.0);
                    report.shown.push(region_id);
                }
                OpOutcome::Shown {
                    region_id,
                    result: Err(err),
                } => {
                    warn!("{err}; will retry next tick");
                    report.failed_shows.push(region_id);
                }
                OpOutcome::Hidden { region_id, result } => {
                    self.displayed.remove(&region_id);
                    match result {
                        Ok(()) => {
                            debug!("region {region_id} hidden");
                            report.hidden.push(region_id);
                        }
                        Err(err) => {
                            warn!("{err}; dropping overlay entry anyway");
                            report.failed_hides.push(region_id);
                        }
                    }
                }
            }
        }

        report
    }

    /// Plans, applies and records in one go against a surface owned by the
    /// caller's thread.
    pub fn reconcile(
        &mut self,
        effective_app: Option<&str>,
        apps: &[MonitoredApp],
        surface: &mut dyn OverlaySurface,
    ) -> ReconcilePlan {
        let plan = self.plan(effective_app, apps);
        if !plan.is_empty() {
            let outcomes = execute(surface, self.operations(&plan));
            self.record(outcomes);
        }
        plan
    }

    pub fn is_displayed(&self, region_id: RegionId) -> bool {
        self.displayed.contains_key(&region_id)
    }

    pub fn displayed_count(&self) -> usize {
        self.displayed.len()
    }
}
