// Fixed-interval driver: arms a tick every interval and never waits for it to finish.
// Overlap is resolved by the agent's single-active-tick guard (skip-if-busy).

use crate::agent::Agent;
use std::sync::Arc;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval, interval_at};
use tracing::Instrument;

pub struct SchedulerConfig {
    pub interval_ms: u64,
    /// How often to log agent counters (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Spawns the scheduler loop. It runs until `shutdown_rx` fires (or its sender is dropped).
/// Ticks already in flight at shutdown are not awaited.
pub fn spawn(
    agent: Arc<Agent>,
    config: SchedulerConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let SchedulerConfig {
        interval_ms,
        stats_log_interval_secs,
    } = config;
    let period = Duration::from_millis(interval_ms);
    let stats_log_interval = Duration::from_secs(stats_log_interval_secs);

    let scheduler_span = tracing::span!(
        tracing::Level::DEBUG,
        "scheduler",
        server_id = %agent.server_id(),
        interval_ms
    );

    tokio::spawn(
        async move {
            // First tick one period after start.
            let mut tick = interval_at(Instant::now() + period, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut stats_log_tick = interval(stats_log_interval);
            stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let agent = agent.clone();
                        tokio::spawn(
                            async move {
                                agent.tick().await;
                            }
                            .in_current_span(),
                        );
                    }
                    _ = stats_log_tick.tick() => {
                        let stats = agent.stats();
                        tracing::info!(
                            ticks_started = stats.ticks_started,
                            ticks_skipped = stats.ticks_skipped,
                            delivered = stats.delivered,
                            delivery_failures = stats.delivery_failures,
                            sample_failures = stats.sample_failures,
                            "agent stats"
                        );
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Scheduler shutting down");
                        break;
                    }
                }
            }
        }
        .instrument(scheduler_span),
    )
}
