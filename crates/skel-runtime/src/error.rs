//! Error types for the worker pool.

use skel_types::CallError;

/// Errors that can occur in the runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Invalid pool size {0}: must be between 1 and {max}", max = crate::config::MAX_POOL_SIZE)]
    InvalidPoolSize(usize),

    #[error("Worker pool has shut down")]
    Terminated,

    #[error("Worker thread panicked")]
    ThreadPanic,

    #[error("Failed to spawn worker thread: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

impl From<RuntimeError> for CallError {
    fn from(err: RuntimeError) -> Self {
        CallError::runtime(err.to_string())
    }
}
