//! Crate-level error types for `overalloc-kernel`.
//!
//! [`KernelError`] is carried in an [`error_stack::Report`] so callers can
//! attach context while propagating.
//!
//! ```rust,ignore
//! use error_stack::{Report, ResultExt};
//! use overalloc_kernel::error::{KernelError, KernelResult};
//!
//! fn load(path: &str) -> KernelResult<OverAllocationConfig> {
//!     overalloc_kernel::config::load_layered(&[path], Some(ENV_PREFIX))
//!         .map_err(KernelError::from)
//!         .map_err(Report::new)
//!         .attach(format!("loading {path}"))
//! }
//! ```
//!
//! Allocation policies do not use this type: they return
//! [`MonitorError`](crate::monitor::MonitorError) unchanged.

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// Configuration could not be loaded or failed validation.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Convenience result alias using [`error_stack::Report`].
pub type KernelResult<T> = Result<T, error_stack::Report<KernelError>>;
