// Instantaneous readings from the system source

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

impl MemoryReading {
    /// used / total * 100; 0 when total is unknown.
    pub fn usage_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.total_bytes as f64) * 100.0
    }
}

/// One mounted filesystem, in the order the system reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct FilesystemUsage {
    pub mount: String,
    pub size_bytes: u64,
    pub usage_percent: f64,
}

/// Output of one `MetricSampler::collect` call; all values in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Utilization {
    pub cpu_pct: f64,
    pub ram_pct: f64,
    pub disk_pct: f64,
}
