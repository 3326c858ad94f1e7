//! Over-allocation thresholds.

use serde::{Deserialize, Serialize};

/// Per-resource fraction of the nominal allocation that may be utilized
/// before no further over-allocation is offered.
///
/// Values are expected in `[0.0, 1.0]`. Nothing here rejects other values;
/// range checks belong to configuration loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceThresholds {
    memory: f32,
    cpu: f32,
}

impl ResourceThresholds {
    pub fn new(memory: f32, cpu: f32) -> Self {
        Self { memory, cpu }
    }

    /// The same threshold for every resource type.
    pub fn uniform(threshold: f32) -> Self {
        Self::new(threshold, threshold)
    }

    pub fn memory_threshold(&self) -> f32 {
        self.memory
    }

    pub fn cpu_threshold(&self) -> f32 {
        self.cpu
    }
}

impl std::fmt::Display for ResourceThresholds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "memory={:.2}, cpu={:.2}", self.memory, self.cpu)
    }
}
