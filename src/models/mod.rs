// Domain models: host identity, raw readings, rates and the ingest payload

mod host;
mod network;
mod payload;
mod reading;

pub use host::{CpuIdentity, HostProfile, OsIdentity};
pub use network::{NetworkCounterSnapshot, NetworkCounters, NetworkRate};
pub use payload::MetricsPayload;
pub use reading::{FilesystemUsage, MemoryReading, Utilization};
