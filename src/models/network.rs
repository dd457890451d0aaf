// Network counter and throughput models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cumulative byte counters of the primary interface, as read from the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Counters plus the instant they were read; the tracker keeps exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkCounterSnapshot {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub timestamp: DateTime<Utc>,
}

impl NetworkCounterSnapshot {
    pub fn new(counters: NetworkCounters, timestamp: DateTime<Utc>) -> Self {
        Self {
            rx_bytes: counters.rx_bytes,
            tx_bytes: counters.tx_bytes,
            timestamp,
        }
    }
}

/// Throughput in bytes per second. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkRate {
    pub rx_bps: f64,
    pub tx_bps: f64,
}

impl NetworkRate {
    pub const ZERO: NetworkRate = NetworkRate {
        rx_bps: 0.0,
        tx_bps: 0.0,
    };
}
