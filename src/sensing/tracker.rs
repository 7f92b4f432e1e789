use crate::models::{find_activated, ForegroundSample, MonitoredApp};

/// Belief about which app is in the foreground, updated once per tick.
///
/// A transition always replaces the belief. A quiet sample keeps the
/// previous app only while it is still monitored and activated in the
/// current snapshot; otherwise the belief is cleared.
#[derive(Debug, Default)]
pub struct ForegroundTracker {
    effective_app: Option<String>,
}

impl ForegroundTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, sample: &ForegroundSample, apps: &[MonitoredApp]) -> Option<&str> {
        match sample {
            ForegroundSample::Transition(app_id) => {
                self.effective_app = Some(app_id.clone());
            }
            ForegroundSample::Quiet => {
                let still_monitored = self
                    .effective_app
                    .as_deref()
                    .is_some_and(|app_id| find_activated(apps, app_id).is_some());
                if !still_monitored {
                    self.effective_app = None;
                }
            }
        }

        self.effective_app()
    }

    pub fn effective_app(&self) -> Option<&str> {
        self.effective_app.as_deref()
    }

    pub fn clear(&mut self) {
        self.effective_app = None;
    }
}
