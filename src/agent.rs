// One agent instance: owns its components and runs a single collect-and-send tick.

use crate::config::AgentConfig;
use crate::dispatcher::{DeliveryOutcome, Dispatcher};
use crate::error::DeliveryError;
use crate::host_profile::HostProfileCache;
use crate::models::{MetricsPayload, NetworkRate};
use crate::net_rate::NetworkRateTracker;
use crate::sampler::MetricSampler;
use crate::source::SystemSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// What a tick did. Ticks never return errors.
#[derive(Debug)]
pub enum TickOutcome {
    Sent(MetricsPayload),
    DeliveryFailed(MetricsPayload),
    /// CPU or memory could not be read; nothing was sent.
    SampleFailed,
    /// Another tick was still in flight.
    Skipped,
}

#[derive(Debug, Default)]
struct AgentStats {
    ticks_started: AtomicU64,
    ticks_skipped: AtomicU64,
    delivered: AtomicU64,
    delivery_failures: AtomicU64,
    sample_failures: AtomicU64,
}

/// Point-in-time copy of the agent counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentStatsSnapshot {
    pub ticks_started: u64,
    pub ticks_skipped: u64,
    pub delivered: u64,
    pub delivery_failures: u64,
    pub sample_failures: u64,
}

/// Single-active-tick flag; released on drop, including on unwind.
struct TickGuard<'a>(&'a AtomicBool);

impl<'a> TickGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TickGuard(flag))
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Agent {
    server_id: String,
    source: Arc<dyn SystemSource>,
    host_profile: HostProfileCache,
    sampler: MetricSampler,
    net_tracker: Mutex<NetworkRateTracker>,
    dispatcher: Dispatcher,
    busy: AtomicBool,
    /// Set while the source reports no usable interface; cleared once counters return.
    network_missing: AtomicBool,
    stats: AgentStats,
}

impl Agent {
    pub fn new(config: &AgentConfig, source: Arc<dyn SystemSource>) -> Result<Self, DeliveryError> {
        let dispatcher = Dispatcher::new(config.dashboard_url.clone(), config.ingest_secret.clone())?;
        Ok(Self::with_dispatcher(config.server_id.clone(), source, dispatcher))
    }

    pub fn with_dispatcher(
        server_id: impl Into<String>,
        source: Arc<dyn SystemSource>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            host_profile: HostProfileCache::new(source.clone()),
            sampler: MetricSampler::new(source.clone()),
            source,
            net_tracker: Mutex::new(NetworkRateTracker::new()),
            dispatcher,
            busy: AtomicBool::new(false),
            network_missing: AtomicBool::new(false),
            stats: AgentStats::default(),
        }
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub fn host_profile(&self) -> &HostProfileCache {
        &self.host_profile
    }

    pub fn stats(&self) -> AgentStatsSnapshot {
        AgentStatsSnapshot {
            ticks_started: self.stats.ticks_started.load(Ordering::Relaxed),
            ticks_skipped: self.stats.ticks_skipped.load(Ordering::Relaxed),
            delivered: self.stats.delivered.load(Ordering::Relaxed),
            delivery_failures: self.stats.delivery_failures.load(Ordering::Relaxed),
            sample_failures: self.stats.sample_failures.load(Ordering::Relaxed),
        }
    }

    /// Collect, build the payload and send it. Returns `Skipped` without doing
    /// anything if another tick on this agent has not finished yet.
    pub async fn tick(&self) -> TickOutcome {
        let Some(_guard) = TickGuard::acquire(&self.busy) else {
            self.stats.ticks_skipped.fetch_add(1, Ordering::Relaxed);
            debug!(server_id = %self.server_id, "previous tick still in flight, skipping");
            return TickOutcome::Skipped;
        };
        self.stats.ticks_started.fetch_add(1, Ordering::Relaxed);

        let (profile, usage, rate) = tokio::join!(
            self.host_profile.get(),
            self.sampler.collect(),
            self.sample_network()
        );

        let info = match profile {
            Ok(p) => Some(p.clone()),
            Err(e) => {
                warn!(error = %e, operation = e.operation, "host profile unavailable");
                None
            }
        };
        let usage = match usage {
            Ok(u) => u,
            Err(e) => {
                self.stats.sample_failures.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, operation = e.operation, "collect failed");
                return TickOutcome::SampleFailed;
            }
        };

        let payload = MetricsPayload::new(
            self.server_id.clone(),
            chrono::Utc::now().timestamp(),
            usage,
            rate,
            info,
        );
        match self.dispatcher.send(&payload).await {
            DeliveryOutcome::Delivered { .. } => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                TickOutcome::Sent(payload)
            }
            DeliveryOutcome::Dropped(_) => {
                self.stats.delivery_failures.fetch_add(1, Ordering::Relaxed);
                TickOutcome::DeliveryFailed(payload)
            }
        }
    }

    /// Counters are read while holding the tracker so snapshots advance in read order.
    async fn sample_network(&self) -> NetworkRate {
        let mut tracker = self.net_tracker.lock().await;
        match self.source.network_counters().await {
            Ok(Some(counters)) => {
                if self.network_missing.swap(false, Ordering::Relaxed) {
                    debug!("network interface available again");
                }
                tracker.sample(counters, chrono::Utc::now())
            }
            Ok(None) => {
                if self.network_missing.swap(true, Ordering::Relaxed) {
                    debug!("no network counters; reporting zero throughput");
                } else {
                    warn!(
                        operation = "network_counters",
                        "no usable network interface; reporting zero throughput until one appears"
                    );
                }
                NetworkRate::ZERO
            }
            Err(e) => {
                warn!(error = %e, operation = "network_counters", "network counters unavailable");
                NetworkRate::ZERO
            }
        }
    }
}
