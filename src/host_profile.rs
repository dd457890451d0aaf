// Static host facts, computed once per process.

use crate::error::MetricQueryError;
use crate::models::HostProfile;
use crate::source::SystemSource;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Memoized `HostProfile`. Concurrent first calls share one computation; a failed
/// computation is not cached, so the next call tries again.
pub struct HostProfileCache {
    source: Arc<dyn SystemSource>,
    cell: OnceCell<HostProfile>,
}

impl HostProfileCache {
    pub fn new(source: Arc<dyn SystemSource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<&HostProfile, MetricQueryError> {
        self.cell.get_or_try_init(|| self.compute()).await
    }

    /// The cached profile, if it has been computed.
    pub fn cached(&self) -> Option<&HostProfile> {
        self.cell.get()
    }

    async fn compute(&self) -> Result<HostProfile, MetricQueryError> {
        let source = self.source.as_ref();
        let (os, cpu, memory, filesystems) = tokio::try_join!(
            async {
                source
                    .os_identity()
                    .await
                    .map_err(|e| MetricQueryError::new("os_identity", e))
            },
            async {
                source
                    .cpu_identity()
                    .await
                    .map_err(|e| MetricQueryError::new("cpu_identity", e))
            },
            async {
                source
                    .memory()
                    .await
                    .map_err(|e| MetricQueryError::new("memory", e))
            },
            async {
                source
                    .filesystems()
                    .await
                    .map_err(|e| MetricQueryError::new("filesystems", e))
            },
        )?;

        let profile = HostProfile::from_parts(
            &os,
            &cpu,
            memory.total_bytes,
            filesystems.iter().map(|fs| fs.size_bytes),
        );
        debug!(
            hostname = %profile.hostname,
            os = %profile.os,
            cpu_model = %profile.cpu_model,
            cpu_cores = profile.cpu_cores,
            "host profile computed"
        );
        Ok(profile)
    }
}
