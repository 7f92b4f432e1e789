use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::BlockerError;
use crate::models::{ForegroundSample, UsageEvent, UsageEventKind};
use crate::platform::UsageEventSource;

/// Derives the foreground app from the usage-event log over a trailing
/// window.
pub struct ForegroundSampler {
    source: Arc<dyn UsageEventSource>,
    window: chrono::Duration,
}

impl ForegroundSampler {
    pub fn new(source: Arc<dyn UsageEventSource>, window: Duration) -> Self {
        Self {
            source,
            window: chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::seconds(1)),
        }
    }

    /// Samples `[now - window, now]`. A window without transitions is
    /// `Quiet`, not an error.
    pub fn sample(&self, now: DateTime<Utc>) -> Result<ForegroundSample, BlockerError> {
        let events = self
            .source
            .query_events(now - self.window, now)
            .map_err(|err| BlockerError::SampleUnavailable(format!("{err:#}")))?;

        Ok(last_foreground_transition(&events))
    }
}

/// Most recent to-foreground transition in `events`. Ties on timestamp go to
/// the event that comes later in the sequence.
pub fn last_foreground_transition(events: &[UsageEvent]) -> ForegroundSample {
    let mut latest: Option<&UsageEvent> = None;
    for event in events
        .iter()
        .filter(|event| event.kind == UsageEventKind::MoveToForeground)
    {
        if latest.map_or(true, |current| event.timestamp >= current.timestamp) {
            latest = Some(event);
        }
    }

    match latest {
        Some(event) => ForegroundSample::Transition(event.app_id.clone()),
        None => ForegroundSample::Quiet,
    }
}
