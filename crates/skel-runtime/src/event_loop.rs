//! Caller-side event loop.
//!
//! The event loop owns the worker pool and the receiving end of the
//! completion channel. Completion handlers are only ever invoked from
//! [`EventLoop::run`] or [`EventLoop::run_once`], so callers see
//! single-threaded callback semantics no matter how many workers exist.

use std::cell::RefCell;
use std::collections::HashMap;

use skel_types::CallError;
use tokio::sync::{mpsc, Mutex};

use crate::completion::{CompletionHandler, Promise};
use crate::config::PoolConfig;
use crate::error::RuntimeError;
use crate::pool::{PoolStatus, WorkerPool};
use crate::task::{Completed, Task, TaskId};

/// Single-threaded owner of a worker pool.
///
/// Not `Sync`: one caller context submits work and receives outcomes.
///
/// Dropping the loop with work still pending drops the pending handlers
/// unrun. `Callback` handlers are never called (only a warning is
/// logged); `Deferred` promises resolve to a `Runtime` error.
pub struct EventLoop {
    pool: WorkerPool,
    completions: Mutex<mpsc::UnboundedReceiver<Completed>>,
    pending: RefCell<HashMap<TaskId, CompletionHandler>>,
}

impl EventLoop {
    /// Start an event loop with a pool of the given size.
    pub fn new(config: PoolConfig) -> Result<Self, RuntimeError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let pool = WorkerPool::start(config, tx)?;

        Ok(Self {
            pool,
            completions: Mutex::new(rx),
            pending: RefCell::new(HashMap::new()),
        })
    }

    /// Start an event loop sized from `SKEL_THREADPOOL_SIZE`.
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::new(PoolConfig::from_env())
    }

    /// Queue a task; `handler` receives its outcome during a later `run`.
    pub fn submit(&self, task: Task, handler: CompletionHandler) -> Result<TaskId, RuntimeError> {
        let id = task.id();
        tracing::trace!(task = %id, operation = task.operation(), "submitting task");

        self.pending.borrow_mut().insert(id, handler);
        if let Err(e) = self.pool.submit(task) {
            self.pending.borrow_mut().remove(&id);
            return Err(e);
        }
        Ok(id)
    }

    /// Queue a task whose outcome resolves the returned promise.
    pub fn submit_promise(&self, task: Task) -> Result<Promise, RuntimeError> {
        let (handler, promise) = CompletionHandler::deferred();
        self.submit(task, handler)?;
        Ok(promise)
    }

    /// Number of submitted tasks whose handlers have not yet run.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn config(&self) -> PoolConfig {
        self.pool.config()
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.pool.status()
    }

    /// Deliver completions until nothing is pending.
    ///
    /// Handlers may submit further tasks; those are waited for too.
    /// Returns the number of handlers invoked.
    pub async fn run(&self) -> usize {
        let mut delivered = 0;
        while self.run_once().await {
            delivered += 1;
        }
        delivered
    }

    /// Deliver a single completion. Returns `false` if nothing was pending.
    pub async fn run_once(&self) -> bool {
        if self.pending() == 0 {
            return false;
        }

        let next = {
            let mut rx = self.completions.lock().await;
            rx.recv().await
        };

        match next {
            Some(completed) => {
                self.deliver(completed);
                true
            }
            None => {
                // Every worker is gone; fail what is left rather than never calling it.
                self.fail_pending(CallError::runtime("worker pool stopped before the task completed"));
                false
            }
        }
    }

    fn deliver(&self, completed: Completed) {
        let Completed {
            id,
            operation,
            outcome,
            queued,
            latency,
            worker,
        } = completed;

        // Release the borrow before running the handler; it may submit more work.
        let handler = self.pending.borrow_mut().remove(&id);
        let Some(handler) = handler else {
            tracing::warn!(task = %id, %operation, "completion for unknown task");
            return;
        };

        tracing::trace!(
            task = %id,
            %operation,
            worker,
            ok = outcome.is_ok(),
            queued_ms = queued.as_millis() as u64,
            latency_ms = latency.as_millis() as u64,
            "delivering completion"
        );
        handler.complete(outcome);
    }

    /// Stop the workers while keeping the loop, so `run` sees the
    /// completion channel close.
    #[cfg(test)]
    pub(crate) fn shutdown_pool(&mut self) {
        self.pool.shutdown().unwrap();
    }

    fn fail_pending(&self, error: CallError) {
        let drained: Vec<_> = self.pending.borrow_mut().drain().collect();
        for (id, handler) in drained {
            tracing::warn!(task = %id, "failing task: {}", error);
            handler.complete(Err(error.clone()));
        }
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().len();
        if pending > 0 {
            tracing::warn!("EventLoop dropped with {} undelivered completions", pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skel_types::{ErrorKind, Value};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    fn event_loop(size: usize) -> EventLoop {
        EventLoop::new(PoolConfig::new(size).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_callbacks_run_on_caller_thread() {
        let lp = event_loop(4);
        let caller = std::thread::current().id();
        let calls = Rc::new(Cell::new(0));

        for i in 0..10 {
            let calls = Rc::clone(&calls);
            let task = Task::new("echo", move || {
                assert_ne!(std::thread::current().id(), caller);
                Ok(Value::from(i))
            });
            lp.submit(
                task,
                CompletionHandler::callback(move |outcome| {
                    assert_eq!(std::thread::current().id(), caller);
                    assert!(outcome.is_ok());
                    calls.set(calls.get() + 1);
                }),
            )
            .unwrap();
        }

        assert_eq!(lp.pending(), 10);
        assert_eq!(lp.run().await, 10);
        assert_eq!(calls.get(), 10);
        assert_eq!(lp.pending(), 0);
    }

    #[tokio::test]
    async fn test_promise_resolves_after_run() {
        let lp = event_loop(2);
        let promise = lp
            .submit_promise(Task::new("repeat", || Ok(Value::from("hihi"))))
            .unwrap();

        let (delivered, outcome) = tokio::join!(lp.run(), promise);
        assert_eq!(delivered, 1);
        assert_eq!(outcome, Ok(Value::from("hihi")));
    }

    #[tokio::test]
    async fn test_errors_delivered_through_handler() {
        let lp = event_loop(1);
        let promise = lp
            .submit_promise(Task::new("fails", || Err(CallError::domain("not enough rawr"))))
            .unwrap();
        lp.run().await;
        let err = promise.await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[tokio::test]
    async fn test_handlers_can_chain_work() {
        let lp = Rc::new(event_loop(2));
        let results = Rc::new(RefCell::new(Vec::new()));

        let chained_lp = Rc::clone(&lp);
        let chained_results = Rc::clone(&results);
        lp.submit(
            Task::new("first", || Ok(Value::from("first"))),
            CompletionHandler::callback(move |outcome| {
                chained_results.borrow_mut().push(outcome);
                let inner_results = Rc::clone(&chained_results);
                chained_lp
                    .submit(
                        Task::new("second", || Ok(Value::from("second"))),
                        CompletionHandler::callback(move |outcome| {
                            inner_results.borrow_mut().push(outcome);
                        }),
                    )
                    .unwrap();
            }),
        )
        .unwrap();

        assert_eq!(lp.run().await, 2);
        assert_eq!(
            *results.borrow(),
            vec![Ok(Value::from("first")), Ok(Value::from("second"))]
        );
    }

    #[tokio::test]
    async fn test_pool_parallelism_bounds_wall_time() {
        // 8 tasks of 50ms on 4 workers: about two rounds, well under serial time
        let lp = event_loop(4);
        let start = Instant::now();
        for _ in 0..8 {
            lp.submit(
                Task::new("sleep", || {
                    std::thread::sleep(Duration::from_millis(50));
                    Ok(Value::Null)
                }),
                CompletionHandler::callback(|outcome| assert!(outcome.is_ok())),
            )
            .unwrap();
        }
        assert_eq!(lp.run().await, 8);

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(400), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_handlers_fail_when_workers_are_gone() {
        let mut lp = event_loop(2);
        let finished = lp
            .submit_promise(Task::new("finishes", || Ok(Value::from("done"))))
            .unwrap();

        // handlers whose tasks never reached a worker
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        lp.pending.borrow_mut().insert(
            TaskId::new(),
            CompletionHandler::callback(move |outcome| *sink.borrow_mut() = Some(outcome)),
        );
        let (handler, orphan) = CompletionHandler::deferred();
        lp.pending.borrow_mut().insert(TaskId::new(), handler);

        lp.shutdown_pool();
        assert_eq!(lp.run().await, 1);
        assert_eq!(lp.pending(), 0);

        assert_eq!(finished.await, Ok(Value::from("done")));
        let err = seen.borrow_mut().take().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Runtime);
        assert_eq!(err.message(), "worker pool stopped before the task completed");
        assert_eq!(orphan.await.unwrap_err().kind(), ErrorKind::Runtime);

        let err = lp.submit_promise(Task::new("late", || Ok(Value::Null))).unwrap_err();
        assert!(matches!(err, RuntimeError::Terminated));
        assert_eq!(lp.pending(), 0);
    }

    #[tokio::test]
    async fn test_run_with_nothing_pending() {
        let lp = event_loop(1);
        assert_eq!(lp.run().await, 0);
        assert!(!lp.run_once().await);
        assert_eq!(lp.config().size(), 1);
        assert_eq!(lp.pool_status().worker_count, 1);
    }
}
