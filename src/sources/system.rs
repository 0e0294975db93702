//! Local disk and memory usage sampled via `sysinfo`.

use crate::core::{DriveUsage, MetricSnapshot, MetricSource, RamUsage, SourceKind, TimeWindow};
use crate::sources::MetricError;
use async_trait::async_trait;
use sysinfo::{Disks, System};

const BYTES_PER_GB: f64 = 1_073_741_824.0;
const BYTES_PER_MB: u64 = 1_048_576;

/// Instantaneous capacity of the monitored volume. The time window does not
/// apply to local samples.
pub struct SystemDriveSource;

/// Instantaneous memory usage of the local machine.
pub struct SystemRamSource;

fn sample_drive() -> Result<DriveUsage, MetricError> {
    let disks = Disks::new_with_refreshed_list();

    // The root volume is the largest fixed disk on the hosts we target.
    let disk = disks
        .list()
        .iter()
        .filter(|d| !d.is_removable())
        .max_by_key(|d| d.total_space())
        .ok_or_else(|| MetricError::System("no fixed disks found".to_string()))?;

    let total = disk.total_space();
    if total == 0 {
        return Err(MetricError::System(
            "disk reports zero capacity".to_string(),
        ));
    }
    let free = disk.available_space();
    let used = total.saturating_sub(free);

    Ok(DriveUsage {
        total_gb: total as f64 / BYTES_PER_GB,
        used_gb: used as f64 / BYTES_PER_GB,
        used_percent: used as f64 / total as f64 * 100.0,
        free_gb: free as f64 / BYTES_PER_GB,
        free_percent: free as f64 / total as f64 * 100.0,
    })
}

fn sample_ram() -> Result<RamUsage, MetricError> {
    let mut system = System::new();
    system.refresh_memory();

    let total = system.total_memory();
    if total == 0 {
        return Err(MetricError::System(
            "system reports zero total memory".to_string(),
        ));
    }
    let free = system.available_memory();
    let used = total.saturating_sub(free);

    Ok(RamUsage {
        total_mb: total / BYTES_PER_MB,
        used_mb: used / BYTES_PER_MB,
        used_percent: used as f64 / total as f64 * 100.0,
        free_mb: free / BYTES_PER_MB,
        free_percent: free as f64 / total as f64 * 100.0,
    })
}

#[async_trait]
impl MetricSource for SystemDriveSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Drive
    }

    async fn sample(&self, _window: &TimeWindow) -> Result<MetricSnapshot, MetricError> {
        // Disk enumeration hits the filesystem, keep it off the runtime threads.
        let usage = tokio::task::spawn_blocking(sample_drive)
            .await
            .map_err(|e| MetricError::System(e.to_string()))??;
        Ok(MetricSnapshot::Drive(usage))
    }
}

#[async_trait]
impl MetricSource for SystemRamSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Ram
    }

    async fn sample(&self, _window: &TimeWindow) -> Result<MetricSnapshot, MetricError> {
        let usage = tokio::task::spawn_blocking(sample_ram)
            .await
            .map_err(|e| MetricError::System(e.to_string()))??;
        Ok(MetricSnapshot::Ram(usage))
    }
}
