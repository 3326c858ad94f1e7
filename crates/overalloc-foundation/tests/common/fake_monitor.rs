//! Scriptable containers monitor.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use overalloc_kernel::{
    BYTES_PER_MIB, ContainersMonitor, ContainersUtilization, MonitorError, MonitorResult,
    ResourceUtilization,
};
use parking_lot::Mutex;

/// Returns queued readings in order, then repeats the last one.
pub struct FakeMonitor {
    readings: Mutex<VecDeque<MonitorResult<ContainersUtilization>>>,
    last: Mutex<MonitorResult<ContainersUtilization>>,
    calls: AtomicUsize,
    latest_requests: AtomicUsize,
}

impl FakeMonitor {
    pub fn new() -> Self {
        Self {
            readings: Mutex::new(VecDeque::new()),
            last: Mutex::new(Err(MonitorError::NotInitialized)),
            calls: AtomicUsize::new(0),
            latest_requests: AtomicUsize::new(0),
        }
    }

    /// A monitor that always reports the same figures.
    pub fn fixed(used_mib: u64, used_cpu: f32, alloc_mib: u64, alloc_vcores: u64) -> Self {
        let monitor = Self::new();
        monitor.push(reading(used_mib, used_cpu, alloc_mib, alloc_vcores));
        monitor
    }

    pub fn push(&self, snapshot: ContainersUtilization) {
        self.readings.lock().push_back(Ok(snapshot));
    }

    pub fn push_error(&self, error: MonitorError) {
        self.readings.lock().push_back(Err(error));
    }

    /// Number of snapshot fetches served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of fetches that asked for the latest sample.
    pub fn latest_requests(&self) -> usize {
        self.latest_requests.load(Ordering::SeqCst)
    }
}

impl ContainersMonitor for FakeMonitor {
    fn containers_utilization(&self, latest: bool) -> MonitorResult<ContainersUtilization> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if latest {
            self.latest_requests.fetch_add(1, Ordering::SeqCst);
        }

        let mut last = self.last.lock();
        if let Some(next) = self.readings.lock().pop_front() {
            *last = next;
        }
        last.clone()
    }
}

/// Build a snapshot from MiB / vcore figures.
pub fn reading(
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
