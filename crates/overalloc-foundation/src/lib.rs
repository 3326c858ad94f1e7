//! overalloc foundation
//!
//! Concrete building blocks on top of `overalloc-kernel`: the snapshot-based
//! over-allocation policy, the monitors it reads from, and the configuration
//! and factory that wire them together.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use overalloc_foundation::{build_policy, HostMonitor, OverAllocationConfig};
//!
//! let config = OverAllocationConfig::load("overalloc.toml")?;
//! let monitor = Arc::new(HostMonitor::from_config(&config.node));
//! let _sampler = monitor.spawn_sampler(config.sampling.interval());
//! let policy = build_policy(&config, monitor)?;
//!
//! let headroom = policy.available_resources()?;
//! ```

// config module
pub mod config;
pub use config::{NodeResourcesConfig, OverAllocationConfig, SamplingConfig};

// monitor module - containers and host monitors
pub mod monitor;
pub use monitor::{ContainerTracker, HostMonitor};

// policy module - allocation policies and factory
pub mod policy;
pub use policy::{
    DisabledAllocationPolicy, SnapshotBasedOverAllocationPolicy, build_policy, headroom,
};
