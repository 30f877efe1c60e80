// Dispatcher - Validates calls and routes them inline or to the worker pool
//
// Operations are registered by name. Each operation turns its arguments into
// a self-contained work closure; the dispatcher decides where that closure
// runs and who hears about the result.

use std::collections::HashMap;
use std::sync::Arc;

use skel_runtime::{CompletionHandler, EventLoop, Promise, Task, TaskId, Work};
use skel_types::{CallError, Value};

use crate::args::Args;

// ─────────────────────────────────────────────────────────────────────────────
// Operation Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A named callable unit
pub trait Operation: Send + Sync {
    /// Name the operation is registered under
    fn name(&self) -> &str;

    /// Argument position of the completion callback, if the operation takes one
    fn callback_index(&self) -> Option<usize> {
        None
    }

    /// Validate `args` and capture them into a work closure.
    ///
    /// Must not have side effects: nothing runs until the closure is called.
    fn prepare(&self, args: &Args) -> Result<Work, CallError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Call Paths
// ─────────────────────────────────────────────────────────────────────────────

/// Validate and run on the calling thread.
pub fn call_sync(op: &dyn Operation, args: &Args) -> Result<Value, CallError> {
    let work = op.prepare(args)?;
    tracing::trace!(operation = op.name(), "running inline");
    work()
}

/// Validate, then run on the pool and deliver to the callback in `args`.
///
/// The callback is checked first, then the remaining arguments. Any failure
/// here is returned directly and nothing is queued.
pub fn call_async(lp: &EventLoop, op: &dyn Operation, mut args: Args) -> Result<TaskId, CallError> {
    let index = op.callback_index().ok_or_else(|| {
        CallError::invocation(format!("operation '{}' does not take a callback", op.name()))
    })?;
    let callback = args.take_callback(index)?;
    let work = op.prepare(&args)?;

    let id = lp.submit(
        Task::from_work(op.name(), work),
        CompletionHandler::Callback(callback),
    )?;
    Ok(id)
}

/// Validate, then run on the pool and resolve the returned promise.
pub fn call_promise(lp: &EventLoop, op: &dyn Operation, args: &Args) -> Result<Promise, CallError> {
    let work = op.prepare(args)?;
    let promise = lp.submit_promise(Task::from_work(op.name(), work))?;
    Ok(promise)
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of operations, callable by name
#[derive(Clone, Default)]
pub struct Dispatcher {
    operations: HashMap<String, Arc<dyn Operation>>,
}

impl Dispatcher {
    /// Create a new empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation under its own name, replacing any previous one
    pub fn register(&mut self, op: Arc<dyn Operation>) {
        let name = op.name().to_string();
        if self.operations.insert(name.clone(), op).is_some() {
            tracing::debug!(operation = %name, "replaced registered operation");
        }
    }

    /// Builder form of [`Dispatcher::register`]
    pub fn with(mut self, op: impl Operation + 'static) -> Self {
        self.register(Arc::new(op));
        self
    }

    /// Get an operation by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Operation>, CallError> {
        self.operations
            .get(name)
            .cloned()
            .ok_or_else(|| CallError::invocation(format!("no operation named '{}'", name)))
    }

    /// Check if an operation is registered
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Registered operation names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn call_sync(&self, name: &str, args: &Args) -> Result<Value, CallError> {
        call_sync(self.get(name)?.as_ref(), args)
    }

    pub fn call_async(&self, lp: &EventLoop, name: &str, args: Args) -> Result<TaskId, CallError> {
        call_async(lp, self.get(name)?.as_ref(), args)
    }

    pub fn call_promise(&self, lp: &EventLoop, name: &str, args: &Args) -> Result<Promise, CallError> {
        call_promise(lp, self.get(name)?.as_ref(), args)
    }
}
