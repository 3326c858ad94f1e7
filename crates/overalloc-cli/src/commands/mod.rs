//! CLI command implementations

pub mod check;
pub mod probe;

use std::path::PathBuf;

use crate::error::{CliError, CliResult};
use overalloc_foundation::OverAllocationConfig;

/// Load the layered configuration named on the command line.
///
/// With no files only `OVERALLOC_*` environment overrides apply.
pub(crate) fn load_config(paths: &[PathBuf]) -> CliResult<OverAllocationConfig> {
    let paths = paths
        .iter()
        .map(|p| {
            p.to_str()
                .ok_or_else(|| CliError::InvalidPath(p.display().to_string()))
        })
        .collect::<CliResult<Vec<&str>>>()?;

    tracing::debug!(files = paths.len(), "loading configuration");
    Ok(OverAllocationConfig::load_layered(&paths)?)
}
