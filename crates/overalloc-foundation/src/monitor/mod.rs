//! Concrete [`ContainersMonitor`](overalloc_kernel::ContainersMonitor) implementations.
//!
//! - [`ContainerTracker`]: fed by container lifecycle code; allocated totals
//!   are the sum of tracked reservations.
//! - [`HostMonitor`]: samples the host with `sysinfo`; allocated totals are
//!   the node resources configured for containers.

mod host;
mod tracker;

pub use host::{HostMonitor, detect_node_resources};
pub use tracker::ContainerTracker;

/// Current wall-clock time as Unix-epoch milliseconds.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}
