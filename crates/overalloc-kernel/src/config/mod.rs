//! Configuration loading
//!
//! Loads typed configuration from YAML, TOML, JSON, INI, RON or JSON5 files.
//!
//! ## Features
//!
//! - Format detected from the file extension
//! - Environment variable substitution (`${VAR}` and `$VAR` syntax)
//! - Layering: later sources override earlier ones
//! - Environment overrides with a prefix and `__` nesting
//!   (`OVERALLOC_CPU_THRESHOLD=0.6`, `OVERALLOC_NODE__VCORES=16`)

use config::{Config as Cfg, ConfigBuilder, Environment, File, builder::DefaultState};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::LazyLock;

pub use config::FileFormat;

/// Default prefix for environment overrides.
pub const ENV_PREFIX: &str = "OVERALLOC";

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

static BRACED_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("braced env var pattern is valid")
});

static BARE_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("bare env var pattern is valid")
});

/// Detect configuration format from file extension
///
/// | Extension        | Format |
/// |------------------|--------|
/// | `.yaml`, `.yml`  | YAML   |
/// | `.toml`          | TOML   |
/// | `.json`          | JSON   |
/// | `.ini`           | INI    |
/// | `.ron`           | RON    |
/// | `.json5`         | JSON5  |
pub fn detect_format(path: &str) -> ConfigResult<FileFormat> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("No file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        "ini" => Ok(FileFormat::Ini),
        "ron" => Ok(FileFormat::Ron),
        "json5" => Ok(FileFormat::Json5),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Substitute environment variables in a string
///
/// `${VAR}` is replaced first, then bare `$VAR`. Unset variables are left
/// untouched so the parse error points at the original reference.
pub fn substitute_env_vars(content: &str) -> String {
    let braced = BRACED_VAR.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });

    BARE_VAR
        .replace_all(&braced, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

fn read_source(path: &str) -> ConfigResult<(String, FileFormat)> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    Ok((substitute_env_vars(&content), format))
}

fn finish<T>(builder: ConfigBuilder<DefaultState>) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let config = builder
        .build()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::Serialization(e.to_string()))
}

/// Load several files, later files overriding earlier ones, then apply
/// environment overrides when `env_prefix` is given.
///
/// ```rust,ignore
/// let config: OverAllocationConfig =
///     load_layered(&["defaults.toml", "node.yaml"], Some(ENV_PREFIX))?;
/// ```
pub fn load_layered<T>(paths: &[&str], env_prefix: Option<&str>) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let mut builder = Cfg::builder();

    for path in paths {
        let (content, format) = read_source(path)?;
        tracing::debug!(path = %path, ?format, "adding configuration source");
        builder = builder.add_source(File::from_str(&content, format));
    }

    if let Some(prefix) = env_prefix {
        builder = builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
    }

    finish(builder)
}
