use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::overlay::ScreenMetrics;

/// What the tracker does with its foreground belief when a sample fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SampleFailurePolicy {
    /// Treat the failure like a quiet window and keep the last app.
    #[default]
    KeepLast,
    /// Forget the foreground app so every overlay comes down.
    ClearForeground,
}

/// Runtime configuration of the blocking loop.
#[derive(Debug, Clone)]
pub struct BlockerSettings {
    pub tick_interval: Duration,
    /// Trailing window queried for foreground transitions each tick.
    pub sample_window: Duration,
    pub sample_timeout: Duration,
    pub config_poll_interval: Duration,
    pub on_sample_failure: SampleFailurePolicy,
    pub screen: ScreenMetrics,
}

impl Default for BlockerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            sample_window: Duration::from_secs(1),
            sample_timeout: Duration::from_secs(2),
            config_poll_interval: Duration::from_secs(2),
            on_sample_failure: SampleFailurePolicy::KeepLast,
            screen: ScreenMetrics::default(),
        }
    }
}

impl BlockerSettings {
    /// Defaults overridden by `TAPGUARD_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        let millis = |key: &str, current: &mut Duration| {
            if let Some(raw) = lookup(key) {
                match parse_millis(&raw) {
                    Some(value) => *current = value,
                    None => warn!("Ignoring {key}={raw}: expected a positive number of milliseconds"),
                }
            }
        };
        millis("TAPGUARD_TICK_MS", &mut settings.tick_interval);
        millis("TAPGUARD_SAMPLE_WINDOW_MS", &mut settings.sample_window);
        millis("TAPGUARD_SAMPLE_TIMEOUT_MS", &mut settings.sample_timeout);
        millis("TAPGUARD_CONFIG_POLL_MS", &mut settings.config_poll_interval);

        if let Some(raw) = lookup("TAPGUARD_SCREEN") {
            match parse_screen(&raw) {
                Some(screen) => settings.screen = screen,
                None => warn!("Ignoring TAPGUARD_SCREEN={raw}: expected <width>x<height>@<density>"),
            }
        }

        let clear_on_failure = lookup("TAPGUARD_CLEAR_ON_SAMPLE_FAILURE")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if clear_on_failure {
            settings.on_sample_failure = SampleFailurePolicy::ClearForeground;
        }

        settings
    }
}

fn parse_millis(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(ms) => Some(Duration::from_millis(ms)),
    }
}

/// Parses `1080x2400@2.75`.
fn parse_screen(raw: &str) -> Option<ScreenMetrics> {
    let (size, density) = raw.trim().split_once('@')?;
    let (width, height) = size.split_once('x')?;

    let metrics = ScreenMetrics {
        width_px: width.trim().parse().ok()?,
        height_px: height.trim().parse().ok()?,
        density: density.trim().parse().ok()?,
    };
    let valid = metrics.width_px > 0
        && metrics.height_px > 0
        && metrics.density.is_finite()
        && metrics.density > 0.0;
    valid.then_some(metrics)
}
