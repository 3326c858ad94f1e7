//! Allocation policies and the factory that selects one from configuration.
//!
//! | [`PolicyKind`] | Implementation                         |
//! |----------------|----------------------------------------|
//! | `snapshot`     | [`SnapshotBasedOverAllocationPolicy`]  |
//! | `disabled`     | [`DisabledAllocationPolicy`]           |
//!
//! A `snapshot` policy without any configured threshold is built as
//! `disabled`. Reconfiguring means building a new policy and swapping the
//! `Arc`; policies never change after construction.

mod disabled;
mod snapshot;

pub use disabled::DisabledAllocationPolicy;
pub use snapshot::{SnapshotBasedOverAllocationPolicy, headroom};

use std::sync::Arc;

use error_stack::{Report, ResultExt};
use overalloc_kernel::error::{KernelError, KernelResult};
use overalloc_kernel::{AllocationPolicy, ContainersMonitor, PolicyKind};

use crate::config::OverAllocationConfig;

/// Build the policy described by `config`, reading from `monitor`.
///
/// # Errors
///
/// Returns [`KernelError::Config`] if the configuration fails validation.
pub fn build_policy(
    config: &OverAllocationConfig,
    monitor: Arc<dyn ContainersMonitor>,
) -> KernelResult<Arc<dyn AllocationPolicy>> {
    config
        .validate()
        .map_err(KernelError::from)
        .map_err(Report::new)
        .attach("validating over-allocation config")?;

    let resolved = (config.effective_policy(), config.thresholds());
    let policy: Arc<dyn AllocationPolicy> = match resolved {
        (PolicyKind::Snapshot, Some(thresholds)) => {
            tracing::info!(%thresholds, "over-allocation enabled with snapshot policy");
            Arc::new(SnapshotBasedOverAllocationPolicy::new(thresholds, monitor))
        }
        _ => {
            if config.policy == PolicyKind::Snapshot {
                tracing::warn!("no threshold configured, over-allocation disabled");
            } else {
                tracing::info!("over-allocation disabled by configuration");
            }
            Arc::new(DisabledAllocationPolicy)
        }
    };

    Ok(policy)
}
