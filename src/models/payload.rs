// Ingest payload (wire format)

use serde::{Deserialize, Serialize};

use super::{HostProfile, NetworkRate, Utilization};

/// JSON body POSTed to the dashboard each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsPayload {
    pub server_id: String,
    /// Unix seconds.
    pub ts: i64,
    pub cpu: f64,
    pub ram: f64,
    pub disk: f64,
    pub net_rx_bps: f64,
    pub net_tx_bps: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<HostProfile>,
}

impl MetricsPayload {
    pub fn new(
        server_id: impl Into<String>,
        ts: i64,
        usage: Utilization,
        rate: NetworkRate,
        info: Option<HostProfile>,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            ts,
            cpu: usage.cpu_pct,
            ram: usage.ram_pct,
            disk: usage.disk_pct,
            net_rx_bps: rate.rx_bps.max(0.0),
            net_tx_bps: rate.tx_bps.max(0.0),
            info,
        }
    }
}
