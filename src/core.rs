//! Core domain types and service traits for hostwatch
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern component interactions throughout the application.

use crate::sources::MetricError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The time span a windowed metric query covers.
///
/// Invariant: `start < end`. A window is computed fresh for every collection
/// cycle and discarded when the cycle finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates the window `[end - lookback, end]`.
    pub fn lookback(end: DateTime<Utc>, lookback: Duration) -> Self {
        debug_assert!(lookback > Duration::zero());
        Self {
            start: end - lookback,
            end,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Identifies one metric family. The configured list of kinds doubles as the
/// section order of the delivered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Cpu,
    Drive,
    Ram,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Cpu => write!(f, "cpu"),
            SourceKind::Drive => write!(f, "drive"),
            SourceKind::Ram => write!(f, "ram"),
        }
    }
}

/// CPU utilization over a time window, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuUtilization {
    pub average: f64,
    pub maximum: f64,
}

/// Instantaneous disk capacity of the monitored volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveUsage {
    pub total_gb: f64,
    pub used_gb: f64,
    pub used_percent: f64,
    pub free_gb: f64,
    pub free_percent: f64,
}

/// Instantaneous memory usage of the local machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RamUsage {
    pub total_mb: u64,
    pub used_mb: u64,
    pub used_percent: f64,
    pub free_mb: u64,
    pub free_percent: f64,
}

/// One immutable measurement produced by a [`MetricSource`] during a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricSnapshot {
    Cpu(CpuUtilization),
    Drive(DriveUsage),
    Ram(RamUsage),
}

impl MetricSnapshot {
    pub fn kind(&self) -> SourceKind {
        match self {
            MetricSnapshot::Cpu(_) => SourceKind::Cpu,
            MetricSnapshot::Drive(_) => SourceKind::Drive,
            MetricSnapshot::Ram(_) => SourceKind::Ram,
        }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Produces one snapshot of a metric family per collection cycle.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// The metric family this source samples.
    fn kind(&self) -> SourceKind;

    /// Takes one measurement.
    ///
    /// Windowed sources query `window`; instantaneous sources ignore it.
    /// Any failure is returned as a [`MetricError`] and never retried here.
    async fn sample(&self, window: &TimeWindow) -> Result<MetricSnapshot, MetricError>;
}

/// Delivers a composed report to a destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A short name for logging (e.g. "discord").
    fn name(&self) -> &str;

    /// Sends `message`. One best-effort attempt; the caller decides whether
    /// a failure matters.
    async fn send(&self, message: &str) -> Result<()>;
}
