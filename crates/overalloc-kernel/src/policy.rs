//! Allocation policy contract.
//!
//! # Architecture
//!
//! - **Trait definitions** live here in `overalloc-kernel`.
//! - **Concrete policies** (`SnapshotBasedOverAllocationPolicy`,
//!   `DisabledAllocationPolicy`) and the factory that selects between them
//!   live in `overalloc-foundation`.
//!
//! A policy answers one question: how much memory and CPU can be lent out
//! right now on top of what running containers have reserved. Callers treat
//! [`Resource::none`] as "do not over-allocate".

use crate::monitor::MonitorResult;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// Strategy for estimating over-allocation headroom on this node.
///
/// Implementations must not mutate node state. Every call re-reads the
/// monitor; failures from the monitor are returned unchanged.
pub trait AllocationPolicy: Send + Sync {
    /// Resources currently safe to hand out beyond nominal reservations.
    fn available_resources(&self) -> MonitorResult<Resource>;

    /// Short, stable identifier used in logs and CLI output.
    fn kind(&self) -> PolicyKind;
}

/// The policy variants that can be selected by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PolicyKind {
    /// Headroom derived from the latest utilization snapshot.
    #[default]
    Snapshot,
    /// Over-allocation turned off; always answers [`Resource::none`].
    Disabled,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot => write!(f, "snapshot"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_kind_serde() {
        assert_eq!(
            serde_json::to_string(&PolicyKind::Snapshot).unwrap(),
            "\"snapshot\""
        );
        let kind: PolicyKind = serde_json::from_str("\"disabled\"").unwrap();
        assert_eq!(kind, PolicyKind::Disabled);
        assert_eq!(PolicyKind::default(), PolicyKind::Snapshot);
        assert_eq!(PolicyKind::Disabled.to_string(), "disabled");
    }
}
