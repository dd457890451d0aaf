// Cumulative network counters -> instantaneous throughput.

use crate::models::{NetworkCounterSnapshot, NetworkCounters, NetworkRate};
use chrono::{DateTime, Utc};

/// Holds the previous counter reading and turns each new one into bytes/sec.
///
/// Not synchronized: callers serialize access (the agent keeps it behind a mutex
/// and only runs one tick at a time).
#[derive(Debug, Default)]
pub struct NetworkRateTracker {
    last: Option<NetworkCounterSnapshot>,
}

impl NetworkRateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate since the previous call. The first call only records a baseline and returns zero.
    /// The stored snapshot is replaced by `counters` on every call.
    pub fn sample(&mut self, counters: NetworkCounters, now: DateTime<Utc>) -> NetworkRate {
        let current = NetworkCounterSnapshot::new(counters, now);
        let Some(prev) = self.last.replace(current) else {
            return NetworkRate::ZERO;
        };

        let elapsed = match (now - prev.timestamp).num_microseconds() {
            Some(us) if us > 0 => us as f64 / 1_000_000.0,
            _ => return NetworkRate::ZERO,
        };

        // Signed deltas: a counter reset shows up as a decrease and clamps to 0.
        let rx = (current.rx_bytes as f64 - prev.rx_bytes as f64) / elapsed;
        let tx = (current.tx_bytes as f64 - prev.tx_bytes as f64) / elapsed;
        NetworkRate {
            rx_bps: rx.max(0.0),
            tx_bps: tx.max(0.0),
        }
    }

    pub fn last_snapshot(&self) -> Option<&NetworkCounterSnapshot> {
        self.last.as_ref()
    }
}
