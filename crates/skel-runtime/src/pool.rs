// WorkerPool - Fixed-size thread pool for off-thread task execution
//
// Workers share one multi-consumer queue. Finished tasks are pushed onto the
// completion channel, which the owning event loop drains on its own thread.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use tokio::sync::mpsc;

use crate::config::PoolConfig;
use crate::error::RuntimeError;
use crate::task::{Completed, Task};
use crate::worker::{spawn_worker, PoolStats};

/// Snapshot of pool activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub worker_count: usize,
    /// Submitted but not yet picked up
    pub queued: usize,
    /// Currently executing
    pub running: usize,
    /// Finished since the pool started
    pub completed: usize,
}

/// Fixed-size pool of worker threads
pub struct WorkerPool {
    config: PoolConfig,
    job_tx: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Start `config.size()` workers reporting to `completions`.
    pub fn start(
        config: PoolConfig,
        completions: mpsc::UnboundedSender<Completed>,
    ) -> Result<Self, RuntimeError> {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Task>();
        let stats = Arc::new(PoolStats::default());

        let mut pool = Self {
            config,
            job_tx: Some(job_tx),
            workers: Vec::with_capacity(config.size()),
            stats: Arc::clone(&stats),
        };

        for id in 0..config.size() {
            // On failure, dropping `pool` closes the queue and joins what was spawned
            let handle = spawn_worker(id, job_rx.clone(), completions.clone(), Arc::clone(&stats))?;
            pool.workers.push(handle);
        }

        tracing::info!("WorkerPool created with {} workers", config.size());
        Ok(pool)
    }

    /// Enqueue a task. Never blocks.
    pub fn submit(&self, task: Task) -> Result<(), RuntimeError> {
        let job_tx = self.job_tx.as_ref().ok_or(RuntimeError::Terminated)?;
        self.stats.submitted.fetch_add(1, Ordering::SeqCst);
        job_tx.send(task).map_err(|_| {
            self.stats.submitted.fetch_sub(1, Ordering::SeqCst);
            RuntimeError::Terminated
        })
    }

    pub fn config(&self) -> PoolConfig {
        self.config
    }

    pub fn size(&self) -> usize {
        self.config.size()
    }

    pub fn status(&self) -> PoolStatus {
        let submitted = self.stats.submitted.load(Ordering::SeqCst);
        let started = self.stats.started.load(Ordering::SeqCst);
        let finished = self.stats.finished.load(Ordering::SeqCst);

        PoolStatus {
            worker_count: self.workers.len(),
            queued: submitted.saturating_sub(started),
            running: started.saturating_sub(finished),
            completed: finished,
        }
    }

    /// Close the queue and wait for workers to drain it.
    pub fn shutdown(&mut self) -> Result<(), RuntimeError> {
        if self.job_tx.take().is_none() {
            return Ok(());
        }

        tracing::debug!("WorkerPool shutting down");
        let mut panicked = false;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                panicked = true;
            }
        }

        if panicked {
            Err(RuntimeError::ThreadPanic)
        } else {
            Ok(())
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.job_tx.is_none()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!("WorkerPool shutdown failed: {}", e);
        }
    }
}
