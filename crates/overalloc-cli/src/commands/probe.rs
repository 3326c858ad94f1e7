//! `overalloc probe` command implementation

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use overalloc_foundation::{HostMonitor, OverAllocationConfig, build_policy};
use overalloc_kernel::{AllocationPolicy, ContainersMonitor, MonitorError, PolicyKind, Resource};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{OutputFormat, Render};

/// One headroom reading.
#[derive(Debug, Serialize)]
pub struct ProbeReading {
    pub sample: u32,
    pub policy: PolicyKind,
    pub node: Resource,
    pub available: Resource,
}

impl Render for ProbeReading {
    fn render_text(&self) -> String {
        if self.available.is_none() {
            format!("[{}] {} policy: no over-allocation available", self.sample, self.policy)
        } else {
            format!(
                "[{}] {} policy: {} available on top of {}",
                self.sample, self.policy, self.available, self.node
            )
        }
    }
}

/// Build the configured policy, keeping the error report as the source.
fn policy_for(
    config: &OverAllocationConfig,
    monitor: Arc<dyn ContainersMonitor>,
) -> anyhow::Result<Arc<dyn AllocationPolicy>> {
    build_policy(config, monitor)
        .map_err(|report| anyhow::Error::new(report.into_error()))
        .context("building over-allocation policy")
}

/// Execute the `probe` command
pub async fn run(
    paths: &[PathBuf],
    samples: u32,
    interval_ms: Option<u64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let config = super::load_config(paths)?;
    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.sampling.interval());
    if interval.is_zero() {
        anyhow::bail!("sampling interval must be > 0");
    }

    // Readers wait one interval between reads; allow one missed sample.
    let monitor = Arc::new(
        HostMonitor::from_config(&config.node).with_max_staleness(interval * 2),
    );
    let node = monitor.node_resources();
    let policy = policy_for(&config, monitor.clone())?;

    tracing::info!(%node, policy = %policy.kind(), ?interval, "probing host");

    let sampler = monitor.spawn_sampler(interval);
    let result = print_readings(policy.as_ref(), node, samples, interval, format).await;
    sampler.abort();
    result
}

/// Print `samples` readings, one per `interval`, skipping ticks before the
/// first host sample lands.
async fn print_readings(
    policy: &dyn AllocationPolicy,
    node: Resource,
    samples: u32,
    interval: Duration,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);
    let mut reported = 0;

    while reported < samples {
        ticker.tick().await;
        match policy.available_resources() {
            Ok(available) => {
                reported += 1;
                format.print(&ProbeReading {
                    sample: reported,
                    policy: policy.kind(),
                    node,
                    available,
                })?;
            }
            Err(MonitorError::NotInitialized) => {
                tracing::debug!("waiting for first host sample");
            }
            Err(e) => return Err(CliError::Monitor(e).into()),
        }
    }

    Ok(())
}
