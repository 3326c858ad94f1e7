//! overalloc kernel
//!
//! Value types and contracts shared by every over-allocation component:
//! resource amounts, thresholds, the containers monitor the policies read,
//! and the [`AllocationPolicy`](policy::AllocationPolicy) trait itself.
//! Concrete policies and monitors live in `overalloc-foundation`.

// resource module
pub mod resource;
pub use resource::{BYTES_PER_MIB, MIB_SHIFT, Resource, ResourceUtilization};

// thresholds module
pub mod thresholds;
pub use thresholds::ResourceThresholds;

// monitor module
pub mod monitor;
pub use monitor::{ContainersMonitor, ContainersUtilization, MonitorError, MonitorResult};

// policy module
pub mod policy;
pub use policy::{AllocationPolicy, PolicyKind};

// error module
pub mod error;

// config module
pub mod config;
