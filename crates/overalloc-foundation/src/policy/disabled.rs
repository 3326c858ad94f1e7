//! Policy used when over-allocation is turned off.

use overalloc_kernel::{AllocationPolicy, MonitorResult, PolicyKind, Resource};

/// Never lends anything and never touches a monitor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAllocationPolicy;

impl AllocationPolicy for DisabledAllocationPolicy {
    fn available_resources(&self) -> MonitorResult<Resource> {
        Ok(Resource::none())
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::Disabled
    }
}
