//! Worker thread implementation.
//!
//! Each worker is a plain OS thread pulling tasks from the shared queue
//! until the queue is closed and drained.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::Receiver;
use skel_types::CallError;
use tokio::sync::mpsc;

use crate::error::RuntimeError;
use crate::task::{Completed, Task};

/// Counters shared between the pool and its workers.
#[derive(Debug, Default)]
pub(crate) struct PoolStats {
    pub(crate) submitted: AtomicUsize,
    pub(crate) started: AtomicUsize,
    pub(crate) finished: AtomicUsize,
}

/// Spawn a new worker thread
pub(crate) fn spawn_worker(
    id: usize,
    jobs: Receiver<Task>,
    completions: mpsc::UnboundedSender<Completed>,
    stats: Arc<PoolStats>,
) -> Result<JoinHandle<()>, RuntimeError> {
    let handle = thread::Builder::new()
        .name(format!("skel-worker-{}", id))
        .spawn(move || run_worker(id, jobs, completions, stats))?;
    Ok(handle)
}

fn run_worker(
    id: usize,
    jobs: Receiver<Task>,
    completions: mpsc::UnboundedSender<Completed>,
    stats: Arc<PoolStats>,
) {
    tracing::debug!("Worker {} started", id);

    // iter() ends once every sender is gone and the queue is empty
    for task in jobs.iter() {
        let Task {
            id: task_id,
            operation,
            submitted_at,
            work,
        } = task;

        stats.started.fetch_add(1, Ordering::SeqCst);
        let queued = submitted_at.elapsed();
        let started = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
            tracing::error!(worker = id, %operation, "task body panicked");
            Err(CallError::runtime(format!(
                "operation '{}' panicked: {}",
                operation,
                panic_message(payload.as_ref())
            )))
        });

        stats.finished.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(
            worker = id,
            task = %task_id,
            %operation,
            run_ms = started.elapsed().as_millis() as u64,
            "task finished"
        );

        let completed = Completed {
            id: task_id,
            operation,
            outcome,
            queued,
            latency: submitted_at.elapsed(),
            worker: id,
        };

        if completions.send(completed).is_err() {
            // Event loop is gone; nobody is listening for the result.
            tracing::trace!(worker = id, task = %task_id, "completion dropped");
        }
    }

    tracing::debug!("Worker {} stopped", id);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
