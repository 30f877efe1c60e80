//! Skel Runtime
//!
//! Fixed-size worker pool with caller-side completion delivery.
//!
//! # Architecture
//!
//! - `WorkerPool` runs task bodies on a fixed set of OS threads
//! - Workers share one queue and report back over a completion channel
//! - `EventLoop` owns the pool and invokes each task's completion handler
//!   exactly once, on the thread that drives it
//! - Pool size comes from an immutable `PoolConfig`; there is no resize

mod completion;
mod config;
mod error;
mod event_loop;
mod pool;
mod task;
mod worker;

pub use completion::{Callback, CompletionHandler, Promise};
pub use config::{PoolConfig, DEFAULT_POOL_SIZE, MAX_POOL_SIZE, THREADPOOL_SIZE_ENV};
pub use error::RuntimeError;
pub use event_loop::EventLoop;
pub use pool::{PoolStatus, WorkerPool};
pub use task::{Completed, Outcome, Task, TaskId, Work};
