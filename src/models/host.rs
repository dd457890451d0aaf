// Static host identity models

use serde::{Deserialize, Serialize};

/// Static host identity; computed once per process and embedded in every payload as `info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProfile {
    pub hostname: String,
    /// Distro name and release, e.g. "Ubuntu 24.04".
    pub os: String,
    pub cpu_model: String,
    pub cpu_cores: u32,
    pub ram_total_mb: u64,
    pub disk_total_gb: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsIdentity {
    pub hostname: String,
    pub distro: String,
    pub release: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuIdentity {
    pub manufacturer: String,
    pub brand: String,
    /// Logical core count.
    pub cores: u32,
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

impl HostProfile {
    /// Combine the individual identity queries into a profile.
    /// Sizes are rounded to the nearest whole MB / GB.
    pub fn from_parts(
        os: &OsIdentity,
        cpu: &CpuIdentity,
        ram_total_bytes: u64,
        filesystem_sizes: impl IntoIterator<Item = u64>,
    ) -> Self {
        let disk_total_bytes: u64 = filesystem_sizes
            .into_iter()
            .fold(0u64, |sum, size| sum.saturating_add(size));
        Self {
            hostname: os.hostname.clone(),
            os: join_trimmed(&os.distro, &os.release),
            cpu_model: join_trimmed(&cpu.manufacturer, &cpu.brand),
            cpu_cores: cpu.cores,
            ram_total_mb: (ram_total_bytes as f64 / BYTES_PER_MB).round() as u64,
            disk_total_gb: (disk_total_bytes as f64 / BYTES_PER_GB).round() as u64,
        }
    }
}

fn join_trimmed(a: &str, b: &str) -> String {
    format!("{} {}", a.trim(), b.trim()).trim().to_string()
}
