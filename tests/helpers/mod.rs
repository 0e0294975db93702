#![allow(dead_code)]
//! Shared helpers for the integration suite. Each test binary uses a subset.

pub mod mock_source;
pub mod recording_notifier;

use hostwatch::config::CollectionConfig;
use hostwatch::core::{CpuUtilization, DriveUsage, MetricSnapshot, RamUsage, SourceKind};

/// Collection settings used by most cycle tests: short source timeout, all
/// sources enabled.
pub fn test_collection_config() -> CollectionConfig {
    CollectionConfig {
        lookback_minutes: 60,
        period_seconds: 3600,
        source_timeout_seconds: 5,
        sources: vec![SourceKind::Cpu, SourceKind::Drive, SourceKind::Ram],
    }
}

pub fn cpu_snapshot(average: f64, maximum: f64) -> MetricSnapshot {
    MetricSnapshot::Cpu(CpuUtilization { average, maximum })
}

pub fn drive_snapshot() -> MetricSnapshot {
    MetricSnapshot::Drive(DriveUsage {
        total_gb: 100.0,
        used_gb: 40.0,
        used_percent: 40.0,
        free_gb: 60.0,
        free_percent: 60.0,
    })
}

pub fn ram_snapshot() -> MetricSnapshot {
    MetricSnapshot::Ram(RamUsage {
        total_mb: 16384,
        used_mb: 4096,
        used_percent: 25.0,
        free_mb: 12288,
        free_percent: 75.0,
    })
}
