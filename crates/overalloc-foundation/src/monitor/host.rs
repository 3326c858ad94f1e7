//! Host-level monitor backed by `sysinfo`.
//!
//! Treats the whole node as one aggregate container: utilization is what the
//! host reports as used, and the allocated totals are the node resources
//! configured for containers (or the detected host totals).
//!
//! Sampling is blocking. [`HostMonitor::spawn_sampler`] runs it on Tokio's
//! blocking pool at a fixed interval; readers only ever take a read lock on
//! the latest sample.

use std::sync::Arc;
use std::time::{Duration, Instant};

use overalloc_kernel::{
    ContainersMonitor, ContainersUtilization, MIB_SHIFT, MonitorError, MonitorResult, Resource,
    ResourceUtilization,
};
use parking_lot::{Mutex, RwLock};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::now_millis;
use crate::config::NodeResourcesConfig;

#[derive(Debug, Clone, Copy)]
struct Sample {
    snapshot: ContainersUtilization,
    taken_at: Instant,
}

/// Samples host memory and CPU and serves the latest reading.
pub struct HostMonitor {
    node: Resource,
    system: Mutex<System>,
    latest: RwLock<Option<Sample>>,
    max_staleness: Option<Duration>,
}

impl HostMonitor {
    /// Monitor a node offering `node` to containers.
    pub fn new(node: Resource) -> Self {
        let mut system = System::new_with_specifics(refresh_kind());
        // CPU usage is a delta between two refreshes; take the baseline now.
        system.refresh_cpu_usage();

        Self {
            node,
            system: Mutex::new(system),
            latest: RwLock::new(None),
            max_staleness: None,
        }
    }

    /// Build from configuration, filling unset values from the host.
    pub fn from_config(node: &NodeResourcesConfig) -> Self {
        let detected = detect_node_resources();
        Self::new(Resource::new(
            node.memory_mib.unwrap_or(detected.memory_mib),
            node.vcores.unwrap_or(detected.vcores),
        ))
    }

    /// Reject `latest` reads whose sample is older than `max_staleness`.
    pub fn with_max_staleness(mut self, max_staleness: Duration) -> Self {
        self.max_staleness = Some(max_staleness);
        self
    }

    /// Resources the node offers to containers.
    pub fn node_resources(&self) -> Resource {
        self.node
    }

    /// Take a sample now and make it the latest.
    pub fn sample(&self) -> MonitorResult<ContainersUtilization> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(MonitorError::Sampling(format!(
                "host sampling is not supported on {}",
                std::env::consts::OS
            )));
        }

        let utilization = {
            let mut system = self.system.lock();
            system.refresh_memory();
            system.refresh_cpu_usage();

            let busy_percent: f32 = system.cpus().iter().map(|cpu| cpu.cpu_usage()).sum();
            let busy_cores = busy_percent / 100.0;
            ResourceUtilization::new(
                system.used_memory() >> MIB_SHIFT,
                (system.used_memory() + system.used_swap()) >> MIB_SHIFT,
                busy_cores,
            )
        };

        let snapshot = ContainersUtilization::new(
            utilization,
            self.node.memory_bytes(),
            u64::from(self.node.vcores),
        )
        .with_timestamp(now_millis());

        *self.latest.write() = Some(Sample {
            snapshot,
            taken_at: Instant::now(),
        });

        Ok(snapshot)
    }

    /// Sample every `interval` until the returned handle is aborted.
    pub fn spawn_sampler(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let monitor = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let sampler = Arc::clone(&monitor);
                match tokio::task::spawn_blocking(move || sampler.sample()).await {
                    Ok(Ok(snapshot)) => {
                        tracing::debug!(
                            used_mib = snapshot.utilization.physical_memory_mib,
                            used_cpu = snapshot.utilization.cpu,
                            "host utilization sampled"
                        );
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "host utilization sampling failed");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "host sampler task failed, stopping");
                        return;
                    }
                }
            }
        })
    }
}

impl ContainersMonitor for HostMonitor {
    fn containers_utilization(&self, latest: bool) -> MonitorResult<ContainersUtilization> {
        let sample = (*self.latest.read()).ok_or(MonitorError::NotInitialized)?;

        if latest {
            if let Some(max) = self.max_staleness {
                let age = sample.taken_at.elapsed();
                if age > max {
                    return Err(MonitorError::Unavailable(format!(
                        "latest sample is {}ms old",
                        age.as_millis()
                    )));
                }
            }
        }

        Ok(sample.snapshot)
    }
}

impl std::fmt::Debug for HostMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostMonitor")
            .field("node", &self.node)
            .field("max_staleness", &self.max_staleness)
            .finish_non_exhaustive()
    }
}

fn refresh_kind() -> RefreshKind {
    RefreshKind::new()
        .with_memory(MemoryRefreshKind::everything())
        .with_cpu(CpuRefreshKind::new().with_cpu_usage())
}

/// Physical memory and logical CPU count of this host.
pub fn detect_node_resources() -> Resource {
    let system = System::new_with_specifics(refresh_kind());
    let vcores = u32::try_from(system.cpus().len()).unwrap_or(u32::MAX);
    Resource::new(system.total_memory() >> MIB_SHIFT, vcores)
}
