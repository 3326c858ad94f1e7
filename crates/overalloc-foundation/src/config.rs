//! Over-allocation configuration.
//!
//! ```toml
//! policy = "snapshot"
//! general_threshold = 0.8
//! cpu_threshold = 0.6        # overrides general_threshold for CPU
//!
//! [node]
//! memory_mib = 65536         # omit to use the host's physical memory
//! vcores = 16                # omit to use the host's logical CPU count
//!
//! [sampling]
//! interval_ms = 3000
//! ```
//!
//! Every key can be overridden from the environment with the `OVERALLOC_`
//! prefix, e.g. `OVERALLOC_CPU_THRESHOLD=0.5` or `OVERALLOC_NODE__VCORES=8`.

use std::time::Duration;

use overalloc_kernel::config::{self, ConfigError, ConfigResult, ENV_PREFIX};
use overalloc_kernel::{PolicyKind, ResourceThresholds};
use serde::{Deserialize, Serialize};

/// Default interval between host utilization samples.
pub const DEFAULT_SAMPLING_INTERVAL_MS: u64 = 3000;

/// Top-level over-allocation settings for one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverAllocationConfig {
    /// Which policy to run.
    pub policy: PolicyKind,
    /// Threshold applied to every resource without its own value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_threshold: Option<f32>,
    pub node: NodeResourcesConfig,
    pub sampling: SamplingConfig,
}

/// Nominal resources the node offers to containers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeResourcesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mib: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcores: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub interval_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_SAMPLING_INTERVAL_MS,
        }
    }
}

impl SamplingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl OverAllocationConfig {
    /// Load from a file, apply `OVERALLOC_*` overrides and validate.
    pub fn load(path: &str) -> ConfigResult<Self> {
        Self::load_layered(&[path])
    }

    /// Load several files (later ones win), apply overrides and validate.
    pub fn load_layered(paths: &[&str]) -> ConfigResult<Self> {
        let config: Self = config::load_layered(paths, Some(ENV_PREFIX))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_thresholds(mut self, memory: f32, cpu: f32) -> Self {
        self.memory_threshold = Some(memory);
        self.cpu_threshold = Some(cpu);
        self
    }

    pub fn with_general_threshold(mut self, threshold: f32) -> Self {
        self.general_threshold = Some(threshold);
        self
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Check ranges and completeness.
    ///
    /// Thresholds must be finite and within `[0.0, 1.0]`. Either both the
    /// memory and CPU thresholds resolve (directly or through
    /// `general_threshold`) or neither does.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("general_threshold", self.general_threshold),
            ("memory_threshold", self.memory_threshold),
            ("cpu_threshold", self.cpu_threshold),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                    return Err(ConfigError::Invalid(format!(
                        "{name} must be within [0.0, 1.0], got {v}"
                    )));
                }
            }
        }

        match (self.resolved_memory_threshold(), self.resolved_cpu_threshold()) {
            (Some(_), None) => {
                return Err(ConfigError::Invalid(
                    "memory_threshold is set but cpu_threshold is not".into(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid(
                    "cpu_threshold is set but memory_threshold is not".into(),
                ));
            }
            _ => {}
        }

        if self.node.memory_mib == Some(0) {
            return Err(ConfigError::Invalid("node.memory_mib must be > 0".into()));
        }
        if self.node.vcores == Some(0) {
            return Err(ConfigError::Invalid("node.vcores must be > 0".into()));
        }
        if self.sampling.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "sampling.interval_ms must be > 0".into(),
            ));
        }

        Ok(())
    }

    fn resolved_memory_threshold(&self) -> Option<f32> {
        self.memory_threshold.or(self.general_threshold)
    }

    fn resolved_cpu_threshold(&self) -> Option<f32> {
        self.cpu_threshold.or(self.general_threshold)
    }

    /// Thresholds after falling back to `general_threshold`, or `None` when
    /// no threshold is configured at all.
    pub fn thresholds(&self) -> Option<ResourceThresholds> {
        Some(ResourceThresholds::new(
            self.resolved_memory_threshold()?,
            self.resolved_cpu_threshold()?,
        ))
    }

    /// The policy that will actually run: snapshot without thresholds
    /// degrades to disabled.
    pub fn effective_policy(&self) -> PolicyKind {
        match (self.policy, self.thresholds()) {
            (PolicyKind::Snapshot, Some(_)) => PolicyKind::Snapshot,
            _ => PolicyKind::Disabled,
        }
    }
}
