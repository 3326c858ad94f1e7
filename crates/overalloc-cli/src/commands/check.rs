//! `overalloc check` command implementation

use std::path::PathBuf;

use overalloc_foundation::{OverAllocationConfig, monitor::detect_node_resources};
use overalloc_kernel::{PolicyKind, Resource, ResourceThresholds};
use serde::Serialize;

use crate::error::CliResult;
use crate::output::{OutputFormat, Render};

/// Settings after defaults, fallbacks and host detection are applied.
#[derive(Debug, Serialize)]
pub struct ResolvedConfig {
    pub configured_policy: PolicyKind,
    pub effective_policy: PolicyKind,
    pub thresholds: Option<ResourceThresholds>,
    pub node: Resource,
    pub node_detected: bool,
    pub sampling_interval_ms: u64,
}

impl ResolvedConfig {
    pub fn from_config(config: &OverAllocationConfig) -> Self {
        let detected = detect_node_resources();
        Self {
            configured_policy: config.policy,
            effective_policy: config.effective_policy(),
            thresholds: config.thresholds(),
            node: Resource::new(
                config.node.memory_mib.unwrap_or(detected.memory_mib),
                config.node.vcores.unwrap_or(detected.vcores),
            ),
            node_detected: config.node.memory_mib.is_none() || config.node.vcores.is_none(),
            sampling_interval_ms: config.sampling.interval_ms,
        }
    }
}

impl Render for ResolvedConfig {
    fn render_text(&self) -> String {
        let thresholds = self
            .thresholds
            .map(|t| t.to_string())
            .unwrap_or_else(|| "not configured".to_string());
        let source = if self.node_detected { " (detected)" } else { "" };

        [
            format!(
                "policy:     {} (configured: {})",
                self.effective_policy, self.configured_policy
            ),
            format!("thresholds: {thresholds}"),
            format!("node:       {}{source}", self.node),
            format!("sampling:   every {} ms", self.sampling_interval_ms),
        ]
        .join("\n")
    }
}

/// Execute the `check` command
pub fn run(paths: &[PathBuf], format: OutputFormat) -> CliResult<()> {
    let config = super::load_config(paths)?;
    format.print(&ResolvedConfig::from_config(&config))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_valid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("node.toml");
        fs::write(
            &path,
            "general_threshold = 0.8\n[node]\nmemory_mib = 4096\nvcores = 2\n",
        )
        .unwrap();

        let config = super::super::load_config(&[path.clone()]).unwrap();
        let resolved = ResolvedConfig::from_config(&config);
        assert_eq!(resolved.effective_policy, PolicyKind::Snapshot);
        assert_eq!(resolved.thresholds, Some(ResourceThresholds::uniform(0.8)));
        assert_eq!(resolved.node, Resource::new(4096, 2));
        assert!(!resolved.node_detected);
        assert!(resolved.render_text().contains("memory=0.80, cpu=0.80"));

        assert!(run(&[path], OutputFormat::Json).is_ok());
    }

    #[test]
    fn test_check_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("node.yaml");
        fs::write(&path, "cpu_threshold: 1.2\nmemory_threshold: 0.5\n").unwrap();

        assert!(run(&[path], OutputFormat::Text).is_err());
    }
}
