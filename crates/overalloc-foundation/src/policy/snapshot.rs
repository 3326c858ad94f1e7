//! Snapshot-based over-allocation policy.
//!
//! Derives headroom from the single most recent containers utilization
//! sample:
//!
//! ```text
//! memory_available = round(memory_threshold * allocated_pmem_bytes) - (used_mib << 20)
//! vcores_available = round(allocated_vcores * cpu_threshold - used_cpu)
//! ```
//!
//! Memory is computed in bytes and only truncated back to MiB at the end.
//! CPU is rounded once, on the whole expression. If either figure is `<= 0`
//! the answer is [`Resource::none`]: a container needs both memory and CPU,
//! so lending only one of them is never useful.
//!
//! Rounding is half away from zero (`f64::round`). Non-finite intermediate
//! values count as zero headroom.

use std::sync::Arc;

use overalloc_kernel::{
    AllocationPolicy, ContainersMonitor, ContainersUtilization, MIB_SHIFT, MonitorResult,
    PolicyKind, Resource, ResourceThresholds,
};

/// Over-allocation policy that only looks at the latest utilization sample.
pub struct SnapshotBasedOverAllocationPolicy {
    thresholds: ResourceThresholds,
    monitor: Arc<dyn ContainersMonitor>,
}

impl SnapshotBasedOverAllocationPolicy {
    pub fn new(thresholds: ResourceThresholds, monitor: Arc<dyn ContainersMonitor>) -> Self {
        Self {
            thresholds,
            monitor,
        }
    }

    pub fn thresholds(&self) -> ResourceThresholds {
        self.thresholds
    }
}

impl AllocationPolicy for SnapshotBasedOverAllocationPolicy {
    fn available_resources(&self) -> MonitorResult<Resource> {
        let snapshot = self.monitor.containers_utilization(true)?;
        Ok(headroom(&self.thresholds, &snapshot))
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Snapshot
    }
}

impl std::fmt::Debug for SnapshotBasedOverAllocationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotBasedOverAllocationPolicy")
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

/// Headroom for one snapshot under the given thresholds.
///
/// Pure; exposed so admission code and benchmarks can evaluate a snapshot
/// they already hold.
pub fn headroom(thresholds: &ResourceThresholds, snapshot: &ContainersUtilization) -> Resource {
    let utilization = &snapshot.utilization;

    let memory_ceiling_bytes = round_half_away(
        f64::from(thresholds.memory_threshold()) * snapshot.allocated_pmem_bytes as f64,
    );
    let memory_used_bytes = i64::try_from(utilization.physical_memory_bytes()).unwrap_or(i64::MAX);
    let memory_available_bytes = memory_ceiling_bytes.saturating_sub(memory_used_bytes);

    let vcores_available = round_half_away(
        snapshot.allocated_vcores as f64 * f64::from(thresholds.cpu_threshold())
            - f64::from(utilization.cpu),
    );

    tracing::trace!(
        memory_ceiling_bytes,
        memory_used_bytes,
        memory_available_bytes,
        vcores_allocated = snapshot.allocated_vcores,
        vcores_used = utilization.cpu,
        vcores_available,
        "computed over-allocation headroom"
    );

    if memory_available_bytes <= 0 || vcores_available <= 0 {
        return Resource::none();
    }

    Resource::new(
        (memory_available_bytes >> MIB_SHIFT) as u64,
        u32::try_from(vcores_available).unwrap_or(u32::MAX),
    )
}

fn round_half_away(value: f64) -> i64 {
    if value.is_finite() {
        // `as` saturates at the i64 bounds
        value.round() as i64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overalloc_kernel::{BYTES_PER_MIB, MonitorError, ResourceUtilization};

    fn snapshot(
        used_mib: u64,
        used_cpu: f32,
        alloc_mib: u64,
        alloc_vcores: u64,
    ) -> ContainersUtilization {
        ContainersUtilization::new(
            ResourceUtilization::new(used_mib, 0, used_cpu),
            alloc_mib * BYTES_PER_MIB,
            alloc_vcores,
        )
    }

    struct Fixed(MonitorResult<ContainersUtilization>);

    impl ContainersMonitor for Fixed {
        fn containers_utilization(&self, _latest: bool) -> MonitorResult<ContainersUtilization> {
            self.0.clone()
        }
    }

    #[test]
    fn test_both_resources_available() {
        let t = ResourceThresholds::new(0.5, 1.0);
        assert_eq!(
            headroom(&t, &snapshot(2048, 1.0, 10240, 4)),
            Resource::new(3072, 3)
        );
    }

    #[test]
    fn test_memory_over_ceiling_is_none() {
        let t = ResourceThresholds::new(0.5, 1.0);
        assert_eq!(headroom(&t, &snapshot(6000, 0.0, 10240, 64)), Resource::none());
    }

    #[test]
    fn test_memory_exactly_at_ceiling_is_none() {
        let t = ResourceThresholds::new(0.5, 1.0);
        assert_eq!(headroom(&t, &snapshot(5120, 0.0, 10240, 4)), Resource::none());
    }

    #[test]
    fn test_zero_cpu_threshold_is_none() {
        let t = ResourceThresholds::new(1.0, 0.0);
        assert_eq!(headroom(&t, &snapshot(0, 0.0, 10240, 4)), Resource::none());
        assert_eq!(headroom(&t, &snapshot(0, 0.3, 10240, 4)), Resource::none());
    }

    #[test]
    fn test_cpu_rounded_once_half_away_from_zero() {
        let t = ResourceThresholds::new(1.0, 0.5);
        // 5 * 0.5 - 1.0 = 1.5 -> 2
        assert_eq!(headroom(&t, &snapshot(0, 1.0, 1024, 5)).vcores, 2);
        // 5 * 0.5 - 1.1 = 1.4 -> 1
        assert_eq!(headroom(&t, &snapshot(0, 1.1, 1024, 5)).vcores, 1);
        // 4 * 1.0 - 3.6 = 0.4 -> 0 -> none
        let t = ResourceThresholds::new(1.0, 1.0);
        assert_eq!(headroom(&t, &snapshot(0, 3.6, 1024, 4)), Resource::none());
    }

    #[test]
    fn test_sub_mebibyte_memory_truncates_to_zero() {
        // ceiling = round(0.5 * (2 MiB + 1 byte)) = 1 MiB + 1 byte (0.5 rounds up)
        let snap = ContainersUtilization::new(
            ResourceUtilization::new(1, 0, 0.0),
            2 * BYTES_PER_MIB + 1,
            4,
        );
        let r = headroom(&ResourceThresholds::new(0.5, 1.0), &snap);
        assert_eq!(r, Resource::new(0, 4));
    }

    #[test]
    fn test_out_of_range_thresholds_do_not_panic() {
        let snap = snapshot(1024, 1.0, 4096, 4);
        assert_eq!(
            headroom(&ResourceThresholds::new(-1.0, -1.0), &snap),
            Resource::none()
        );
        assert_eq!(
            headroom(&ResourceThresholds::new(2.0, 2.0), &snap),
            Resource::new(7168, 7)
        );
        assert_eq!(
            headroom(&ResourceThresholds::new(f32::INFINITY, f32::NAN), &snap),
            Resource::none()
        );
    }

    #[test]
    fn test_policy_reads_monitor() {
        let policy = SnapshotBasedOverAllocationPolicy::new(
            ResourceThresholds::new(0.5, 1.0),
            Arc::new(Fixed(Ok(snapshot(2048, 1.0, 10240, 4)))),
        );
        assert_eq!(policy.available_resources().unwrap(), Resource::new(3072, 3));
        assert_eq!(policy.kind(), PolicyKind::Snapshot);
    }

    #[test]
    fn test_policy_propagates_monitor_error() {
        let policy = SnapshotBasedOverAllocationPolicy::new(
            ResourceThresholds::uniform(0.9),
            Arc::new(Fixed(Err(MonitorError::Unavailable("cgroup gone".into())))),
        );
        assert_eq!(
            policy.available_resources(),
            Err(MonitorError::Unavailable("cgroup gone".into()))
        );
    }
}
