use skel_runtime::{EventLoop, TaskId};
use skel_types::{CallError, Value};

use crate::args::Args;
use crate::dispatcher::{call_async, call_sync, Dispatcher};
use crate::ops::{BusyThreads, ContentiousThreads, Shout, SleepyThreads, Wave};

/// Result of calling a method by name
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResult {
    /// Synchronous method returned directly
    Value(Value),
    /// Asynchronous method queued; its callback fires during `EventLoop::run`
    Queued(TaskId),
}

/// The exported class: one sync method and four pool-backed ones
#[derive(Clone)]
pub struct HelloWorld {
    methods: Dispatcher,
}

impl HelloWorld {
    pub fn new() -> Self {
        Self::with_methods(
            Dispatcher::new()
                .with(Wave)
                .with(Shout)
                .with(SleepyThreads)
                .with(BusyThreads::new())
                .with(ContentiousThreads::new()),
        )
    }

    /// Use a custom method table
    pub fn with_methods(methods: Dispatcher) -> Self {
        tracing::debug!(methods = ?methods.names(), "HelloWorld created");
        Self { methods }
    }

    pub fn wave(&self) -> Result<Value, CallError> {
        self.methods.call_sync("wave", &Args::new())
    }

    pub fn shout(&self, lp: &EventLoop, args: Args) -> Result<TaskId, CallError> {
        self.methods.call_async(lp, "shout", args)
    }

    pub fn sleepy_threads(&self, lp: &EventLoop, args: Args) -> Result<TaskId, CallError> {
        self.methods.call_async(lp, "sleepy_threads", args)
    }

    pub fn busy_threads(&self, lp: &EventLoop, args: Args) -> Result<TaskId, CallError> {
        self.methods.call_async(lp, "busy_threads", args)
    }

    pub fn contentious_threads(&self, lp: &EventLoop, args: Args) -> Result<TaskId, CallError> {
        self.methods.call_async(lp, "contentious_threads", args)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains(name)
    }

    pub fn methods(&self) -> Vec<&str> {
        self.methods.names()
    }

    /// Call a method by name, routing on whether it takes a callback.
    pub fn call(&self, lp: &EventLoop, method: &str, args: Args) -> Result<MethodResult, CallError> {
        let op = self.methods.get(method)?;
        match op.callback_index() {
            Some(_) => call_async(lp, op.as_ref(), args).map(MethodResult::Queued),
            None => call_sync(op.as_ref(), &args).map(MethodResult::Value),
        }
    }
}

impl Default for HelloWorld {
    fn default() -> Self {
        Self::new()
    }
}
