//! Configuration file (skel.toml)
//!
//! Every section is optional. Pool size resolution, highest first:
//! command line, `SKEL_THREADPOOL_SIZE`, `[pool] size`, built-in default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skel_runtime::{PoolConfig, RuntimeError, DEFAULT_POOL_SIZE};
use thiserror::Error;

/// Default tracing filter when neither `RUST_LOG` nor `[log] filter` is set
pub const DEFAULT_LOG_FILTER: &str = "skel=info,skel_runtime=info";

/// Phrase used by benchmark runs
pub const DEFAULT_BENCH_PHRASE: &str = "rawr";

/// Config loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid pool size: {0}")]
    PoolSize(#[from] RuntimeError),
}

/// Root of skel.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkelConfig {
    #[serde(default)]
    pub pool: PoolSection,
    #[serde(default)]
    pub log: LogSection,
    #[serde(default)]
    pub bench: BenchSection,
}

/// `[pool]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolSection {
    pub size: Option<usize>,
}

/// `[log]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSection {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// `[bench]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchSection {
    #[serde(default = "default_bench_phrase")]
    pub phrase: String,
}

impl Default for BenchSection {
    fn default() -> Self {
        Self {
            phrase: default_bench_phrase(),
        }
    }
}

fn default_bench_phrase() -> String {
    DEFAULT_BENCH_PHRASE.to_string()
}

impl SkelConfig {
    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from a file if one was given, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the pool size, `cli` taking precedence.
    pub fn pool_config(&self, cli: Option<usize>) -> Result<PoolConfig, ConfigError> {
        if let Some(size) = cli {
            return Ok(PoolConfig::new(size)?);
        }
        if let Some(config) = PoolConfig::from_env_if_set() {
            return Ok(config);
        }
        let size = self.pool.size.unwrap_or(DEFAULT_POOL_SIZE);
        Ok(PoolConfig::new(size)?)
    }
}
