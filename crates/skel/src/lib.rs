//! Skel
//!
//! Call dispatch onto a fixed worker pool, with synchronous, callback and
//! promise calling conventions over one operation catalog.
//!
//! # Architecture
//!
//! - `Args` carries positional values and callbacks from the caller
//! - An `Operation` validates its arguments into a self-contained work closure
//! - `call_sync` runs it inline; `call_async` and `call_promise` queue it on the
//!   `skel_runtime::EventLoop` pool and deliver the outcome exactly once
//! - Argument errors are returned before anything is queued; rule failures
//!   inside the work arrive through the completion path

pub mod args;
pub mod bench;
pub mod config;
pub mod dispatcher;
pub mod module;
pub mod objects;
pub mod ops;

pub use args::{Arg, Args};
pub use config::{ConfigError, SkelConfig};
pub use dispatcher::{call_async, call_promise, call_sync, Dispatcher, Operation};
pub use objects::{HelloObject, HelloObjectAsync, HelloWorld, MethodResult};

pub use skel_runtime::{CompletionHandler, EventLoop, Outcome, PoolConfig, Promise, TaskId};
pub use skel_types::{CallError, ErrorKind, Value};
