//! One-shot completion handlers.
//!
//! A handler is consumed by [`CompletionHandler::complete`], so it cannot be
//! invoked twice. The event loop guarantees it is invoked at least once.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use skel_types::CallError;
use tokio::sync::oneshot;

use crate::task::Outcome;

/// Callback invoked on the event loop's thread. It does not need to be `Send`.
pub type Callback = Box<dyn FnOnce(Outcome) + 'static>;

/// Receiver of exactly one task outcome.
pub enum CompletionHandler {
    /// Node-style callback
    Callback(Callback),
    /// Resolves a [`Promise`]
    Deferred(oneshot::Sender<Outcome>),
}

impl CompletionHandler {
    pub fn callback<F>(f: F) -> Self
    where
        F: FnOnce(Outcome) + 'static,
    {
        CompletionHandler::Callback(Box::new(f))
    }

    /// Create a deferred handler and the promise it resolves.
    pub fn deferred() -> (Self, Promise) {
        let (tx, rx) = oneshot::channel();
        (CompletionHandler::Deferred(tx), Promise { rx })
    }

    /// Deliver the outcome.
    pub fn complete(self, outcome: Outcome) {
        match self {
            CompletionHandler::Callback(f) => f(outcome),
            CompletionHandler::Deferred(tx) => {
                if tx.send(outcome).is_err() {
                    tracing::trace!("promise dropped before resolution");
                }
            }
        }
    }
}

impl fmt::Debug for CompletionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionHandler::Callback(_) => write!(f, "CompletionHandler::Callback"),
            CompletionHandler::Deferred(_) => write!(f, "CompletionHandler::Deferred"),
        }
    }
}

/// Future side of a deferred completion.
///
/// Resolves once with the task outcome. If the event loop goes away before
/// delivering, it resolves with a runtime error instead.
#[derive(Debug)]
pub struct Promise {
    rx: oneshot::Receiver<Outcome>,
}

impl Promise {
    /// Take the outcome if it has already been delivered.
    pub fn try_take(&mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(dropped())),
        }
    }
}

impl Future for Promise {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or_else(|_| Err(dropped())))
    }
}

fn dropped() -> CallError {
    CallError::runtime("event loop dropped before the task completed")
}
