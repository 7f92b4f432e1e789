use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UsageEvent;

use super::UsageEventSource;

/// One recorded app switch, relative to the start of the replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedSwitch {
    pub after_ms: u64,
    pub app_id: String,
}

/// Replays a recorded sequence of foreground switches as if they were
/// happening live, starting from `started`.
pub struct ReplayEventSource {
    events: Vec<UsageEvent>,
}

impl ReplayEventSource {
    pub fn new(started: DateTime<Utc>, switches: Vec<ScriptedSwitch>) -> Self {
        let mut events: Vec<UsageEvent> = switches
            .into_iter()
            .filter_map(|switch| {
                let offset = Duration::try_milliseconds(i64::try_from(switch.after_ms).ok()?)?;
                let at = started.checked_add_signed(offset)?;
                Some(UsageEvent::foreground(at, switch.app_id))
            })
            .collect();
        events.sort_by_key(|event| event.timestamp);

        Self { events }
    }

    pub fn from_file(path: &Path, started: DateTime<Utc>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script from {}", path.display()))?;
        let switches: Vec<ScriptedSwitch> = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid replay script {}", path.display()))?;

        log::info!(
            "Loaded {} scripted foreground switches from {}",
            switches.len(),
            path.display()
        );
        Ok(Self::new(started, switches))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl UsageEventSource for ReplayEventSource {
    fn query_events(&self, begin: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<UsageEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|event| event.timestamp >= begin && event.timestamp <= end)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn switch(after_ms: u64, app_id: &str) -> ScriptedSwitch {
        ScriptedSwitch {
            after_ms,
            app_id: app_id.to_string(),
        }
    }

    #[test]
    fn only_events_inside_the_window_are_returned() {
        let start = Utc::now();
        let source = ReplayEventSource::new(
            start,
            vec![switch(3_000, "c"), switch(0, "a"), switch(1_500, "b")],
        );

        let window = source
            .query_events(start + Duration::milliseconds(1_000), start + Duration::milliseconds(3_000))
            .unwrap();
        let ids: Vec<&str> = window.iter().map(|event| event.app_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn loads_camel_case_script_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("script.json");
        fs::write(&path, r#"[{"afterMs": 10, "appId": "com.example.video"}]"#).unwrap();

        let source = ReplayEventSource::from_file(&path, Utc::now()).unwrap();
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn malformed_script_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("script.json");
        fs::write(&path, "not json").unwrap();

        assert!(ReplayEventSource::from_file(&path, Utc::now()).is_err());
    }
}
