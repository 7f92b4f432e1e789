use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UsageEventKind {
    MoveToForeground,
    MoveToBackground,
    Other,
}

/// One entry of the OS usage-event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: UsageEventKind,
    pub app_id: String,
}

impl UsageEvent {
    pub fn foreground(timestamp: DateTime<Utc>, app_id: impl Into<String>) -> Self {
        Self {
            timestamp,
            kind: UsageEventKind::MoveToForeground,
            app_id: app_id.into(),
        }
    }
}

/// What the sampler saw during one trailing window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForegroundSample {
    /// The app that most recently moved to the foreground.
    Transition(String),
    /// No app switched during the window.
    Quiet,
}

impl ForegroundSample {
    pub fn app_id(&self) -> Option<&str> {
        match self {
            ForegroundSample::Transition(app_id) => Some(app_id),
            ForegroundSample::Quiet => None,
        }
    }
}
