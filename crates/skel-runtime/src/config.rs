//! Worker pool configuration.
//!
//! The pool size is fixed when the pool is built. There is no way to change
//! it afterwards; build a new pool instead.

use crate::error::RuntimeError;

/// Environment variable read by [`PoolConfig::from_env`].
pub const THREADPOOL_SIZE_ENV: &str = "SKEL_THREADPOOL_SIZE";

/// Pool size used when nothing else is configured.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Upper bound on worker threads.
pub const MAX_POOL_SIZE: usize = 1024;

/// Immutable worker pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_POOL_SIZE,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with an explicit worker count.
    pub fn new(size: usize) -> Result<Self, RuntimeError> {
        if size == 0 || size > MAX_POOL_SIZE {
            return Err(RuntimeError::InvalidPoolSize(size));
        }
        Ok(Self { size })
    }

    /// Read the worker count from `SKEL_THREADPOOL_SIZE`.
    ///
    /// Missing, unparsable or zero values fall back to the default. Values
    /// above the maximum are clamped.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(THREADPOOL_SIZE_ENV).ok().as_deref())
    }

    /// Like [`PoolConfig::from_env`], but returns `None` when the variable is unset.
    pub fn from_env_if_set() -> Option<Self> {
        std::env::var(THREADPOOL_SIZE_ENV)
            .ok()
            .map(|raw| Self::from_env_value(Some(&raw)))
    }

    pub(crate) fn from_env_value(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        match raw.trim().parse::<usize>() {
            Ok(0) | Err(_) => {
                tracing::warn!(
                    value = raw,
                    default = DEFAULT_POOL_SIZE,
                    "invalid {}, using default pool size",
                    THREADPOOL_SIZE_ENV
                );
                Self::default()
            }
            Ok(size) if size > MAX_POOL_SIZE => {
                tracing::warn!(
                    value = size,
                    max = MAX_POOL_SIZE,
                    "{} too large, clamping",
                    THREADPOOL_SIZE_ENV
                );
                Self {
                    size: MAX_POOL_SIZE,
                }
            }
            Ok(size) => Self { size },
        }
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(matches!(PoolConfig::new(0), Err(RuntimeError::InvalidPoolSize(0))));
        assert!(PoolConfig::new(MAX_POOL_SIZE + 1).is_err());
        assert_eq!(PoolConfig::new(8).unwrap().size(), 8);
    }

    #[test]
    fn test_env_value_parsing() {
        assert_eq!(PoolConfig::from_env_value(None).size(), DEFAULT_POOL_SIZE);
        assert_eq!(PoolConfig::from_env_value(Some("10")).size(), 10);
        assert_eq!(PoolConfig::from_env_value(Some(" 2 ")).size(), 2);
        assert_eq!(PoolConfig::from_env_value(Some("0")).size(), DEFAULT_POOL_SIZE);
        assert_eq!(PoolConfig::from_env_value(Some("lots")).size(), DEFAULT_POOL_SIZE);
        assert_eq!(PoolConfig::from_env_value(Some("5000")).size(), MAX_POOL_SIZE);
    }
}
