use skel_runtime::{EventLoop, TaskId};
use skel_types::{CallError, Value};

use crate::args::{Arg, Args};
use crate::dispatcher::call_async;
use crate::objects::hello_object::name_arg;
use crate::ops::HelloAsync;

/// Name used when none is given
pub const DEFAULT_NAME: &str = "world";

/// Object whose greeting is computed on the worker pool
#[derive(Debug, Clone)]
pub struct HelloObjectAsync {
    name: String,
    op: HelloAsync,
}

impl HelloObjectAsync {
    /// Build from call arguments; a missing name defaults to `world`.
    pub fn new(args: &Args) -> Result<Self, CallError> {
        let name = match args.get(0) {
            None | Some(Arg::Value(Value::Undefined)) => DEFAULT_NAME.to_string(),
            Some(arg) => name_arg(arg)?,
        };
        Ok(Self::build(name))
    }

    pub fn named(name: impl Into<String>) -> Result<Self, CallError> {
        Self::new(&Args::new().with(name.into()))
    }

    fn build(name: String) -> Self {
        let op = HelloAsync::with_greeting(format!("...threads are busy async bees...hello {}", name));
        Self { name, op }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `helloAsync(options, callback)` against this object's name
    pub fn hello_async(&self, lp: &EventLoop, args: Args) -> Result<TaskId, CallError> {
        call_async(lp, &self.op, args)
    }

    /// Replace the per-call map size; used to keep tests and smoke runs quick
    pub fn with_work(mut self, work_to_do: usize) -> Self {
        self.op = self.op.with_work(work_to_do);
        self
    }
}

impl Default for HelloObjectAsync {
    fn default() -> Self {
        Self::build(DEFAULT_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skel_runtime::{Outcome, PoolConfig};
    use skel_types::ErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event_loop() -> EventLoop {
        EventLoop::new(PoolConfig::new(2).unwrap()).unwrap()
    }

    async fn greet(h: &HelloObjectAsync, louder: bool) -> Outcome {
        let lp = event_loop();
        let result = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&result);
        let args = Args::new()
            .with(Value::object_from_pairs([("louder", louder)]))
            .with_callback(move |outcome| *slot.borrow_mut() = Some(outcome));
        h.hello_async(&lp, args).unwrap();
        lp.run().await;
        let outcome = result.borrow_mut().take();
        outcome.unwrap()
    }

    #[tokio::test]
    async fn test_greets_by_name() {
        let h = HelloObjectAsync::named("carol").unwrap().with_work(100);
        assert_eq!(
            greet(&h, false).await,
            Ok(Value::from("...threads are busy async bees...hello carol"))
        );
    }

    #[tokio::test]
    async fn test_default_name_louder() {
        let h = HelloObjectAsync::new(&Args::new()).unwrap().with_work(100);
        assert_eq!(h.name(), "world");
        assert_eq!(
            greet(&h, true).await,
            Ok(Value::from("...threads are busy async bees...hello world!!!!"))
        );
    }

    #[test]
    fn test_construction_errors() {
        let err = HelloObjectAsync::named("").unwrap_err();
        assert_eq!(err.message(), "arg must be a non-empty string");

        let err = HelloObjectAsync::new(&Args::new().with(24)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
        assert!(err.message().contains("arg must be a string"));
    }

    #[test]
    fn test_invalid_options_rejected_before_queueing() {
        let lp = event_loop();
        let h = HelloObjectAsync::default();

        let opts = Value::object_from_pairs([("louder", "oops")]);
        let err = h.hello_async(&lp, Args::new().with(opts).with_callback(|_| {})).unwrap_err();
        assert!(err.message().contains("option 'louder' must be a boolean"));

        let err = h.hello_async(&lp, Args::new().with("oops").with_callback(|_| {})).unwrap_err();
        assert!(err.message().contains("first arg 'options' must be an object"));

        let err = h.hello_async(&lp, Args::new().with(Value::empty_object())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invocation);
        assert_eq!(lp.pending(), 0);
    }
}
