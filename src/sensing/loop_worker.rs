use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::BlockerError;
use crate::models::ForegroundSample;
use crate::overlay::{ApplyReport, OpOutcome, SurfaceDispatcher, SurfaceOp};
use crate::regions::SnapshotReader;
use crate::settings::BlockerSettings;

use super::engine::BlockerEngine;
use super::sampler::ForegroundSampler;

// Set to false to silence per-tick logging in this module
const LOG_TICKS: bool = true;

use crate::{tick_debug, tick_info, tick_warn};

/// Everything one run of the blocking loop needs.
pub struct LoopContext {
    pub sampler: Arc<ForegroundSampler>,
    pub snapshots: SnapshotReader,
    pub dispatcher: SurfaceDispatcher,
    pub settings: BlockerSettings,
}

/// Fixed-delay polling loop. The token is checked at the top of every tick;
/// a tick that has started always runs to completion, and every overlay is
/// taken down before the loop returns.
pub async fn blocking_loop(ctx: LoopContext, cancel_token: CancellationToken) {
    let mut engine = BlockerEngine::new(ctx.settings.screen, ctx.settings.on_sample_failure);
    let mut query = SampleQuery::default();
    tick_info!(
        "blocking loop started (tick {}ms, window {}ms)",
        ctx.settings.tick_interval.as_millis(),
        ctx.settings.sample_window.as_millis()
    );

    loop {
        if cancel_token.is_cancelled() {
            break;
        }

        run_tick(&ctx, &mut engine, &mut query).await;

        tokio::select! {
            _ = tokio::time::sleep(ctx.settings.tick_interval) => {}
            _ = cancel_token.cancelled() => {}
        }
    }

    let report = drain(&ctx, &mut engine).await;
    tick_info!(
        "blocking loop stopped; removed {} overlays ({} removals failed)",
        report.hidden.len(),
        report.failed_hides.len()
    );
}

async fn run_tick(
    ctx: &LoopContext,
    engine: &mut BlockerEngine,
    query: &mut SampleQuery,
) -> ApplyReport {
    let sample = query.sample(&ctx.sampler, ctx.settings.sample_timeout).await;
    let snapshot = ctx.snapshots.latest();

    let (_, ops) = engine.begin_tick(sample, snapshot.as_deref().map(Vec::as_slice));
    let outcomes = apply_on_surface(&ctx.dispatcher, ops).await;
    let report = engine.finish_tick(outcomes);

    if !report.failed_shows.is_empty() || !report.failed_hides.is_empty() {
        tick_debug!(
            "tick finished with {} failed shows and {} failed hides",
            report.failed_shows.len(),
            report.failed_hides.len()
        );
    }
    report
}

async fn drain(ctx: &LoopContext, engine: &mut BlockerEngine) -> ApplyReport {
    let ops = engine.shutdown_operations();
    let outcomes = apply_on_surface(&ctx.dispatcher, ops).await;
    let report = engine.finish_tick(outcomes);
    engine.reset();
    report
}

type QueryJob = JoinHandle<Result<ForegroundSample, BlockerError>>;

/// At most one event query at a time. A query that outlives its timeout is
/// kept here, and no new one starts until it has finished.
#[derive(Default)]
struct SampleQuery {
    pending: Option<QueryJob>,
}

impl SampleQuery {
    /// Runs the event query off the runtime threads. Timeouts, worker panics
    /// and a still-running earlier query count as an unavailable sample.
    async fn sample(
        &mut self,
        sampler: &Arc<ForegroundSampler>,
        timeout: Duration,
    ) -> Result<ForegroundSample, BlockerError> {
        if let Some(job) = &self.pending {
            if !job.is_finished() {
                return Err(BlockerError::SampleUnavailable(
                    "previous query still running".to_string(),
                ));
            }
            // Its window is stale by now.
            self.pending = None;
        }

        let sampler = Arc::clone(sampler);
        let now = Utc::now();
        let mut job = tokio::task::spawn_blocking(move || sampler.sample(now));

        match tokio::time::timeout(timeout, &mut job).await {
            Ok(Ok(sample)) => sample,
            Ok(Err(join_err)) => Err(BlockerError::SampleUnavailable(format!(
                "sampler worker failed: {join_err}"
            ))),
            Err(_) => {
                self.pending = Some(job);
                Err(BlockerError::SampleUnavailable(format!(
                    "event query exceeded {}ms",
                    timeout.as_millis()
                )))
            }
        }
    }
}

/// Sends `ops` to the surface thread. If the thread is gone every op is
/// reported as failed.
async fn apply_on_surface(dispatcher: &SurfaceDispatcher, ops: Vec<SurfaceOp>) -> Vec<OpOutcome> {
    if ops.is_empty() {
        return Vec::new();
    }

    match dispatcher.apply(ops.clone()).await {
        Ok(outcomes) => outcomes,
        Err(err) => {
            let err = BlockerError::SurfaceUnavailable(format!("{err:#}"));
            tick_warn!("{err}");
            let reason = err.to_string();
            ops.iter().map(|op| OpOutcome::failed(op, &reason)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UsageEvent;
    use crate::overlay::ScreenMetrics;
    use crate::regions::snapshot_channel;
    use crate::test_utils::{app, FakeSurface, ScriptedSource, SharedSurface};
    use crate::platform::UsageEventSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_settings() -> BlockerSettings {
        BlockerSettings {
            tick_interval: Duration::from_millis(10),
            sample_timeout: Duration::from_millis(500),
            screen: ScreenMetrics {
                width_px: 1080,
                height_px: 1920,
                density: 1.0,
            },
            ..BlockerSettings::default()
        }
    }

    #[tokio::test]
    async fn slow_query_counts_as_unavailable() {
        struct StuckSource;
        impl UsageEventSource for StuckSource {
            fn query_events(
                &self,
                _begin: chrono::DateTime<Utc>,
                _end: chrono::DateTime<Utc>,
            ) -> anyhow::Result<Vec<UsageEvent>> {
                std::thread::sleep(std::time::Duration::from_millis(200));
                Ok(Vec::new())
            }
        }

        let sampler = Arc::new(ForegroundSampler::new(Arc::new(StuckSource), Duration::from_secs(1)));
        let sample = SampleQuery::default()
            .sample(&sampler, Duration::from_millis(20))
            .await;
        assert!(matches!(sample, Err(BlockerError::SampleUnavailable(_))));
    }

    #[tokio::test]
    async fn hung_query_is_never_run_twice_at_once() {
        #[derive(Default)]
        struct HungSource {
            running: AtomicUsize,
            peak: AtomicUsize,
            calls: AtomicUsize,
        }
        impl UsageEventSource for HungSource {
            fn query_events(
                &self,
                _begin: chrono::DateTime<Utc>,
                _end: chrono::DateTime<Utc>,
            ) -> anyhow::Result<Vec<UsageEvent>> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let now_running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now_running, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(300));
                self.running.fetch_sub(1, Ordering::SeqCst);
                Ok(Vec::new())
            }
        }

        let source = Arc::new(HungSource::default());
        let sampler = Arc::new(ForegroundSampler::new(source.clone(), Duration::from_secs(1)));
        let mut query = SampleQuery::default();

        for tick in 0..5 {
            let sample = query.sample(&sampler, Duration::from_millis(20)).await;
            match sample {
                Err(BlockerError::SampleUnavailable(reason)) if tick > 0 => {
                    assert_eq!(reason, "previous query still running")
                }
                Err(BlockerError::SampleUnavailable(_)) => {}
                other => panic!("unexpected sample {other:?}"),
            }
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.peak.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let sample = query.sample(&sampler, Duration::from_millis(20)).await;
        assert!(matches!(sample, Err(BlockerError::SampleUnavailable(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_tick_shows_and_drain_removes() {
        let source = Arc::new(ScriptedSource::new());
        source.push_events(vec![UsageEvent::foreground(Utc::now(), "x")]);
        let (publisher, snapshots) = snapshot_channel();
        publisher.publish(vec![app("x", true, &[1, 2])]);
        let surface = SharedSurface::new();
        let handle = surface.clone();
        let dispatcher = SurfaceDispatcher::spawn(move || Ok(handle)).unwrap();

        let settings = fast_settings();
        let ctx = LoopContext {
            sampler: Arc::new(ForegroundSampler::new(source, settings.sample_window)),
            snapshots,
            dispatcher,
            settings,
        };
        let mut engine = BlockerEngine::new(ctx.settings.screen, ctx.settings.on_sample_failure);

        let report = run_tick(&ctx, &mut engine, &mut SampleQuery::default()).await;
        assert_eq!(report.shown, vec![1, 2]);
        assert_eq!(surface.live_count(), 2);

        let report = drain(&ctx, &mut engine).await;
        assert_eq!(report.hidden, vec![1, 2]);
        assert_eq!(surface.live_count(), 0);
        assert_eq!(engine.effective_app(), None);
    }

    #[tokio::test]
    async fn cancelled_token_still_drains() {
        let (publisher, snapshots) = snapshot_channel();
        publisher.publish(Vec::new());
        let dispatcher = SurfaceDispatcher::spawn(|| Ok(FakeSurface::new())).unwrap();
        let settings = fast_settings();
        let ctx = LoopContext {
            sampler: Arc::new(ForegroundSampler::new(
                Arc::new(ScriptedSource::new()),
                settings.sample_window,
            )),
            snapshots,
            dispatcher,
            settings,
        };

        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), blocking_loop(ctx, token))
            .await
            .expect("loop should exit once cancelled");
    }
}
