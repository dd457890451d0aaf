// Seam between the agent and the machine it runs on.

use crate::models::{CpuIdentity, FilesystemUsage, MemoryReading, NetworkCounters, OsIdentity};
use async_trait::async_trait;

/// Raw system queries. Each call reads fresh values; nothing here is cached.
///
/// `SysinfoRepo` is the production implementation. Tests substitute scripted sources.
#[async_trait]
pub trait SystemSource: Send + Sync {
    async fn os_identity(&self) -> anyhow::Result<OsIdentity>;

    async fn cpu_identity(&self) -> anyhow::Result<CpuIdentity>;

    /// Instantaneous CPU load in percent, 0..=100.
    async fn cpu_load(&self) -> anyhow::Result<f64>;

    async fn memory(&self) -> anyhow::Result<MemoryReading>;

    /// Mounted filesystems in the order the system reports them.
    async fn filesystems(&self) -> anyhow::Result<Vec<FilesystemUsage>>;

    /// Cumulative counters of the primary interface, or `None` when there is no usable interface.
    async fn network_counters(&self) -> anyhow::Result<Option<NetworkCounters>>;
}
