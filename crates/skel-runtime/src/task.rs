//! Units of work submitted to the pool.

use std::fmt;
use std::time::{Duration, Instant};

use skel_types::{CallError, Value};

/// Result of running a task body.
pub type Outcome = Result<Value, CallError>;

/// Task body. Runs on a worker thread and must own everything it touches.
pub type Work = Box<dyn FnOnce() -> Outcome + Send + 'static>;

/// Unique identifier of an in-flight task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(uuid::Uuid);

impl TaskId {
    pub(crate) fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One requested unit of work.
///
/// The validated input payload lives inside the work closure; the task owns
/// it exclusively until a worker consumes it.
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) operation: String,
    pub(crate) submitted_at: Instant,
    pub(crate) work: Work,
}

impl Task {
    pub fn new<F>(operation: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> Outcome + Send + 'static,
    {
        Self::from_work(operation, Box::new(work))
    }

    pub fn from_work(operation: impl Into<String>, work: Work) -> Self {
        Self {
            id: TaskId::new(),
            operation: operation.into(),
            submitted_at: Instant::now(),
            work,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn submitted_at(&self) -> Instant {
        self.submitted_at
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("operation", &self.operation)
            .field("submitted_at", &self.submitted_at)
            .finish_non_exhaustive()
    }
}

/// A finished task on its way back to the submitting context.
#[derive(Debug)]
pub struct Completed {
    pub id: TaskId,
    pub operation: String,
    pub outcome: Outcome,
    /// Time between submission and a worker picking the task up
    pub queued: Duration,
    /// Time between submission and the body returning
    pub latency: Duration,
    /// Index of the worker that ran the body
    pub worker: usize,
}
