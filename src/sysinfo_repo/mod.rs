// System readings via sysinfo

mod linux;

use crate::models::{CpuIdentity, FilesystemUsage, MemoryReading, NetworkCounters, OsIdentity};
use crate::source::SystemSource;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::{Disks, Networks, System};
use tracing::{debug, instrument};

/// `SystemSource` backed by sysinfo. Blocking reads run on the blocking pool.
pub struct SysinfoRepo {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
    last_cpu_refresh: Arc<Mutex<Instant>>,
    net_interface: Option<String>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SysinfoRepo {
    pub fn new(net_interface: Option<String>) -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
            networks: Arc::new(Mutex::new(networks)),
            last_cpu_refresh: Arc::new(Mutex::new(Instant::now())),
            net_interface,
        }
    }
}

#[async_trait]
impl SystemSource for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "os_identity"))]
    async fn os_identity(&self) -> anyhow::Result<OsIdentity> {
        tokio::task::spawn_blocking(|| {
            let hostname = System::host_name().unwrap_or_default();
            let (distro, release) = linux::read_os_release_linux().unwrap_or_else(|| {
                (
                    System::name().unwrap_or_else(|| std::env::consts::OS.into()),
                    System::os_version().unwrap_or_default(),
                )
            });
            Ok(OsIdentity {
                hostname,
                distro,
                release,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_identity"))]
    async fn cpu_identity(&self) -> anyhow::Result<CpuIdentity> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            let first = sys.cpus().first();
            let brand = linux::read_cpu_model_linux()
                .or_else(|| {
                    first
                        .map(|c| c.brand().trim().to_string())
                        .filter(|s| !s.is_empty())
                })
                .unwrap_or_default();
            let manufacturer = first
                .map(|c| linux::vendor_name(c.vendor_id()))
                .unwrap_or_default();
            // Brands usually already start with the vendor ("AMD Ryzen ...").
            let manufacturer = if brand
                .to_lowercase()
                .starts_with(&manufacturer.to_lowercase())
            {
                String::new()
            } else {
                manufacturer
            };
            Ok(CpuIdentity {
                manufacturer,
                brand,
                cores: sys.cpus().len() as u32,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "cpu_load"))]
    async fn cpu_load(&self) -> anyhow::Result<f64> {
        let sys = self.sys.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        tokio::task::spawn_blocking(move || {
            // Lock order: last_cpu_refresh, then sys. The wait happens before sys is taken.
            let mut last = last_cpu_refresh
                .lock()
                .map_err(|e| anyhow::anyhow!("cpu refresh lock poisoned: {}", e))?;

            // Usage is measured between two refreshes; they must be far enough apart.
            let since = last.elapsed();
            if since < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL {
                std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL - since);
            }
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_cpu_usage();
            *last = Instant::now();

            Ok((sys.global_cpu_usage() as f64).clamp(0.0, 100.0))
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "memory"))]
    async fn memory(&self) -> anyhow::Result<MemoryReading> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();
            Ok(MemoryReading {
                total_bytes: sys.total_memory(),
                used_bytes: sys.used_memory(),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "filesystems"))]
    async fn filesystems(&self) -> anyhow::Result<Vec<FilesystemUsage>> {
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks_guard = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            disks_guard.refresh(false);
            Ok(disks_guard
                .list()
                .iter()
                .map(|d| {
                    let total = d.total_space();
                    let used = total.saturating_sub(d.available_space());
                    let usage_percent = if total > 0 {
                        (used as f64 / total as f64) * 100.0
                    } else {
                        0.0
                    };
                    FilesystemUsage {
                        mount: d.mount_point().to_string_lossy().into_owned(),
                        size_bytes: total,
                        usage_percent,
                    }
                })
                .collect())
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "network_counters"))]
    async fn network_counters(&self) -> anyhow::Result<Option<NetworkCounters>> {
        let networks = self.networks.clone();
        let wanted = self.net_interface.clone();
        let total = tokio::task::spawn_blocking(move || {
            let mut networks_guard = networks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
            networks_guard.refresh(true);

            let interfaces: Vec<(&str, NetworkCounters)> = networks_guard
                .list()
                .iter()
                .map(|(name, data)| {
                    (
                        name.as_str(),
                        NetworkCounters {
                            rx_bytes: data.total_received(),
                            tx_bytes: data.total_transmitted(),
                        },
                    )
                })
                .collect();
            let default_route = if wanted.is_some() {
                None
            } else {
                linux::read_default_route_interface_linux()
            };
            anyhow::Ok(select_counters(
                &interfaces,
                wanted.as_deref(),
                default_route.as_deref(),
            ))
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))??;

        if let (None, Some(name)) = (total, self.net_interface.as_deref()) {
            debug!(interface = %name, "configured interface not found");
        }
        Ok(total)
    }
}

/// Counters of the interface to report on: the configured one, else the default-route
/// interface, else the sum over all physical interfaces.
fn select_counters(
    interfaces: &[(&str, NetworkCounters)],
    wanted: Option<&str>,
    default_route: Option<&str>,
) -> Option<NetworkCounters> {
    let by_name = |name: &str| {
        interfaces
            .iter()
            .find(|(iface, _)| *iface == name)
            .map(|(_, counters)| *counters)
    };
    if let Some(name) = wanted {
        return by_name(name);
    }
    if let Some(counters) = default_route.and_then(by_name) {
        return Some(counters);
    }
    interfaces
        .iter()
        .filter(|(name, _)| !linux::is_virtual(name))
        .map(|(_, counters)| *counters)
        .reduce(|acc, c| NetworkCounters {
            rx_bytes: acc.rx_bytes.saturating_add(c.rx_bytes),
            tx_bytes: acc.tx_bytes.saturating_add(c.tx_bytes),
        })
}
