//! In-process container tracker.
//!
//! Container lifecycle code reports starts, stops and utilization readings;
//! the tracker aggregates them into [`ContainersUtilization`] snapshots.
//! Running totals and per-container entries sit behind one lock so a snapshot
//! never mixes utilization from one instant with allocations from another.

use std::collections::HashMap;

use overalloc_kernel::{
    ContainersMonitor, ContainersUtilization, MonitorError, MonitorResult, Resource,
    ResourceUtilization,
};
use parking_lot::RwLock;

use super::now_millis;

#[derive(Debug, Clone, Copy)]
struct TrackedContainer {
    allocation: Resource,
    utilization: ResourceUtilization,
}

#[derive(Debug, Default)]
struct TrackerState {
    containers: HashMap<String, TrackedContainer>,
    allocated: Resource,
    utilization: ResourceUtilization,
    /// Set by the first accepted utilization reading.
    reported: bool,
}

/// Aggregates per-container allocations and utilization.
///
/// Containers that have not reported yet count as zero utilization. Until
/// some container has reported, `latest` snapshots fail with
/// [`MonitorError::NotInitialized`].
#[derive(Debug, Default)]
pub struct ContainerTracker {
    state: RwLock<TrackerState>,
}

impl ContainerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a container with its nominal allocation.
    ///
    /// Returns `false` and leaves the existing entry untouched if the id is
    /// already tracked.
    pub fn start_container(&self, container_id: impl Into<String>, allocation: Resource) -> bool {
        let container_id = container_id.into();
        let mut state = self.state.write();
        if state.containers.contains_key(&container_id) {
            tracing::warn!(%container_id, "container already tracked");
            return false;
        }
        tracing::debug!(%container_id, %allocation, "tracking container");
        state.allocated = state.allocated + allocation;
        state.containers.insert(
            container_id,
            TrackedContainer {
                allocation,
                utilization: ResourceUtilization::default(),
            },
        );
        true
    }

    /// Replace the latest utilization reading of a container.
    ///
    /// Returns `false` if the container is not tracked.
    pub fn record_utilization(
        &self,
        container_id: &str,
        utilization: ResourceUtilization,
    ) -> bool {
        let mut state = self.state.write();
        let TrackerState {
            containers,
            utilization: total,
            reported,
            ..
        } = &mut *state;

        match containers.get_mut(container_id) {
            Some(entry) => {
                total.subtract_from(&entry.utilization);
                total.add_from(&utilization);
                entry.utilization = utilization;
                *reported = true;
                true
            }
            None => {
                tracing::debug!(%container_id, "utilization for untracked container dropped");
                false
            }
        }
    }

    /// Stop tracking a container, returning its allocation.
    pub fn stop_container(&self, container_id: &str) -> Option<Resource> {
        let mut state = self.state.write();
        let entry = state.containers.remove(container_id)?;

        state.allocated = state.allocated - entry.allocation;
        state.utilization.subtract_from(&entry.utilization);
        if state.containers.is_empty() {
            // Drop float residue left by repeated add/subtract.
            state.utilization = ResourceUtilization::default();
        }

        tracing::debug!(%container_id, "container no longer tracked");
        Some(entry.allocation)
    }

    /// Sum of nominal allocations of all tracked containers.
    pub fn allocated(&self) -> Resource {
        self.state.read().allocated
    }

    pub fn len(&self) -> usize {
        self.state.read().containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().containers.is_empty()
    }
}

impl ContainersMonitor for ContainerTracker {
    fn containers_utilization(&self, latest: bool) -> MonitorResult<ContainersUtilization> {
        let state = self.state.read();
        if latest && !state.reported {
            return Err(MonitorError::NotInitialized);
        }

        Ok(ContainersUtilization::new(
            state.utilization,
            state.allocated.memory_bytes(),
            u64::from(state.allocated.vcores),
        )
        .with_timestamp(now_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overalloc_kernel::BYTES_PER_MIB;

    #[test]
    fn test_latest_before_any_report_not_initialized() {
        let tracker = ContainerTracker::new();
        assert_eq!(
            tracker.containers_utilization(true),
            Err(MonitorError::NotInitialized)
        );

        // Started but silent containers do not count as a report.
        tracker.start_container("c1", Resource::new(1024, 1));
        assert_eq!(
            tracker.containers_utilization(true),
            Err(MonitorError::NotInitialized)
        );

        let snap = tracker.containers_utilization(false).unwrap();
        assert_eq!(snap.utilization, ResourceUtilization::default());
        assert_eq!(snap.allocated_pmem_bytes, 1024 * BYTES_PER_MIB);

        tracker.record_utilization("c1", ResourceUtilization::new(0, 0, 0.0));
        assert!(tracker.containers_utilization(true).is_ok());
    }

    #[test]
    fn test_unknown_container_report_does_not_initialize() {
        let tracker = ContainerTracker::new();
        assert!(!tracker.record_utilization("ghost", ResourceUtilization::new(1, 1, 1.0)));
        assert_eq!(
            tracker.containers_utilization(true),
            Err(MonitorError::NotInitialized)
        );
    }

    #[test]
    fn test_aggregates_containers() {
        let tracker = ContainerTracker::new();
        assert!(tracker.start_container("c1", Resource::new(4096, 2)));
        assert!(tracker.start_container("c2", Resource::new(6144, 2)));
        assert!(tracker.record_utilization("c1", ResourceUtilization::new(1024, 2048, 0.5)));
        assert!(tracker.record_utilization("c2", ResourceUtilization::new(1024, 1024, 0.5)));

        let snap = tracker.containers_utilization(true).unwrap();
        assert_eq!(snap.utilization.physical_memory_mib, 2048);
        assert_eq!(snap.utilization.virtual_memory_mib, 3072);
        assert!((snap.utilization.cpu - 1.0).abs() < f32::EPSILON);
        assert_eq!(snap.allocated_pmem_bytes, 10240 * BYTES_PER_MIB);
        assert_eq!(snap.allocated_vcores, 4);
        assert!(snap.timestamp_ms > 0);
        assert_eq!(tracker.pmem_allocated_for_containers().unwrap(), 10240 * BYTES_PER_MIB);
    }

    #[test]
    fn test_new_reading_replaces_previous() {
        let tracker = ContainerTracker::new();
        tracker.start_container("c1", Resource::new(4096, 2));
        tracker.record_utilization("c1", ResourceUtilization::new(3000, 3500, 1.5));
        tracker.record_utilization("c1", ResourceUtilization::new(1000, 1200, 0.5));

        let snap = tracker.containers_utilization(true).unwrap();
        assert_eq!(snap.utilization.physical_memory_mib, 1000);
        assert_eq!(snap.utilization.virtual_memory_mib, 1200);
        assert!((snap.utilization.cpu - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_start_keeps_first_allocation() {
        let tracker = ContainerTracker::new();
        assert!(tracker.start_container("c1", Resource::new(1024, 1)));
        assert!(!tracker.start_container("c1", Resource::new(8192, 8)));
        assert_eq!(tracker.allocated(), Resource::new(1024, 1));
    }

    #[test]
    fn test_stop_removes_allocation_and_utilization() {
        let tracker = ContainerTracker::new();
        tracker.start_container("c1", Resource::new(1024, 1));
        tracker.start_container("c2", Resource::new(2048, 2));
        tracker.record_utilization("c1", ResourceUtilization::new(512, 600, 0.7));
        tracker.record_utilization("c2", ResourceUtilization::new(256, 300, 0.2));

        assert_eq!(tracker.stop_container("c1"), Some(Resource::new(1024, 1)));
        assert_eq!(tracker.stop_container("c1"), None);
        assert_eq!(tracker.allocated(), Resource::new(2048, 2));

        let snap = tracker.containers_utilization(true).unwrap();
        assert_eq!(snap.utilization.physical_memory_mib, 256);
        assert!((snap.utilization.cpu - 0.2).abs() < 1e-6);

        tracker.stop_container("c2");
        assert!(tracker.is_empty());
        let snap = tracker.containers_utilization(true).unwrap();
        assert_eq!(snap.utilization, ResourceUtilization::default());
        assert_eq!(snap.allocated_vcores, 0);
    }
}
