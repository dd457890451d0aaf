// Instantaneous CPU / RAM / disk utilization.

use crate::error::MetricQueryError;
use crate::models::{FilesystemUsage, Utilization};
use crate::source::SystemSource;
use std::sync::Arc;
use tracing::warn;

const ROOT_MOUNT: &str = "/";

pub struct MetricSampler {
    source: Arc<dyn SystemSource>,
}

impl MetricSampler {
    pub fn new(source: Arc<dyn SystemSource>) -> Self {
        Self { source }
    }

    /// CPU and memory failures abort the collection; disk data degrades to 0.
    pub async fn collect(&self) -> Result<Utilization, MetricQueryError> {
        let source = self.source.as_ref();
        let (cpu, memory, filesystems) =
            tokio::join!(source.cpu_load(), source.memory(), source.filesystems());

        let cpu_pct = cpu.map_err(|e| MetricQueryError::new("cpu_load", e))?;
        let ram_pct = memory
            .map_err(|e| MetricQueryError::new("memory", e))?
            .usage_percent();
        let disk_pct = match filesystems {
            Ok(list) => root_disk_percent(&list),
            Err(e) => {
                warn!(error = %e, operation = "filesystems", "disk usage unavailable");
                0.0
            }
        };

        Ok(Utilization {
            cpu_pct,
            ram_pct,
            disk_pct,
        })
    }
}

/// Usage of the filesystem mounted at `/`, else of the first one listed, else 0.
pub fn root_disk_percent(filesystems: &[FilesystemUsage]) -> f64 {
    filesystems
        .iter()
        .find(|fs| fs.mount == ROOT_MOUNT)
        .or_else(|| filesystems.first())
        .map(|fs| fs.usage_percent)
        .filter(|pct| pct.is_finite())
        .unwrap_or(0.0)
}
