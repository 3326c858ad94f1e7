//! Containers monitor contract.
//!
//! A monitor reports what running containers actually consume and what was
//! nominally reserved for them. Allocation policies read it through
//! [`ContainersMonitor`] and never depend on a concrete sampler, so tests can
//! hand in deterministic readings.
//!
//! Concrete monitors live in `overalloc-foundation`.

use crate::resource::{ResourceUtilization, MIB_SHIFT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by a monitor while producing a reading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MonitorError {
    /// No sample has been taken yet.
    #[error("containers monitor not yet initialized")]
    NotInitialized,

    /// The monitor is running but cannot currently serve a reading.
    #[error("utilization snapshot unavailable: {0}")]
    Unavailable(String),

    /// The underlying sampler failed.
    #[error("utilization sampling failed: {0}")]
    Sampling(String),
}

/// Convenience result alias for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;

/// One aggregate reading across all running containers.
///
/// Utilization and the allocated totals come from the same sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainersUtilization {
    /// Aggregate measured consumption.
    pub utilization: ResourceUtilization,
    /// Physical memory nominally allocated to containers, in bytes.
    pub allocated_pmem_bytes: u64,
    /// Virtual cores nominally allocated to containers.
    pub allocated_vcores: u64,
    /// Sample time, Unix epoch milliseconds.
    pub timestamp_ms: u64,
}

impl ContainersUtilization {
    pub fn new(
        utilization: ResourceUtilization,
        allocated_pmem_bytes: u64,
        allocated_vcores: u64,
    ) -> Self {
        Self {
            utilization,
            allocated_pmem_bytes,
            allocated_vcores,
            timestamp_ms: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Allocated memory in whole mebibytes.
    pub fn allocated_pmem_mib(&self) -> u64 {
        self.allocated_pmem_bytes >> MIB_SHIFT
    }
}

/// Source of container utilization and nominal allocation figures.
///
/// Implementations own their own synchronization; every method takes `&self`
/// and may be called from any thread.
pub trait ContainersMonitor: Send + Sync {
    /// Return the aggregate containers utilization.
    ///
    /// With `latest = true` the monitor must return its most recent sample
    /// rather than a smoothed or cached value older than its refresh cycle.
    fn containers_utilization(&self, latest: bool) -> MonitorResult<ContainersUtilization>;

    /// Physical memory nominally allocated to containers, in bytes.
    fn pmem_allocated_for_containers(&self) -> MonitorResult<u64> {
        self.containers_utilization(true)
            .map(|snapshot| snapshot.allocated_pmem_bytes)
    }

    /// Virtual cores nominally allocated to containers.
    fn vcores_allocated_for_containers(&self) -> MonitorResult<u64> {
        self.containers_utilization(true)
            .map(|snapshot| snapshot.allocated_vcores)
    }
}

impl<M: ContainersMonitor + ?Sized> ContainersMonitor for std::sync::Arc<M> {
    fn containers_utilization(&self, latest: bool) -> MonitorResult<ContainersUtilization> {
        (**self).containers_utilization(latest)
    }

    fn pmem_allocated_for_containers(&self) -> MonitorResult<u64> {
        (**self).pmem_allocated_for_containers()
    }

    fn vcores_allocated_for_containers(&self) -> MonitorResult<u64> {
        (**self).vcores_allocated_for_containers()
    }
}
