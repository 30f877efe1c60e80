//! CPU-bound operations: `busyThreads` and `contentiousThreads`.
//!
//! Both build the same ordered map; the contentious variant does it while
//! holding a lock every worker shares, so adding workers does not help it.

use skel_runtime::Work;
use skel_types::{CallError, Value};

use crate::args::{required_phrase, Args};
use crate::dispatcher::Operation;
use crate::ops::work::{contended_work, expensive_work, require_rawr, WORK_TO_DO};

/// `busyThreads(phrase, callback)`
#[derive(Debug, Clone, Copy)]
pub struct BusyThreads {
    work_to_do: usize,
}

impl BusyThreads {
    pub fn new() -> Self {
        Self::with_work(WORK_TO_DO)
    }

    /// Size the map each call builds
    pub fn with_work(work_to_do: usize) -> Self {
        Self { work_to_do }
    }
}

impl Default for BusyThreads {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for BusyThreads {
    fn name(&self) -> &str {
        "busy_threads"
    }

    fn callback_index(&self) -> Option<usize> {
        Some(1)
    }

    fn prepare(&self, args: &Args) -> Result<Work, CallError> {
        let phrase = required_phrase(args, 0, "phrase")?;
        let n = self.work_to_do;

        Ok(Box::new(move || {
            require_rawr(&phrase)?;
            expensive_work(n)?;
            Ok(Value::from(format!("{}...threads are busy bees", phrase)))
        }))
    }
}

/// `contentiousThreads(phrase, callback)`
#[derive(Debug, Clone, Copy)]
pub struct ContentiousThreads {
    work_to_do: usize,
}

impl ContentiousThreads {
    pub fn new() -> Self {
        Self::with_work(WORK_TO_DO)
    }

    pub fn with_work(work_to_do: usize) -> Self {
        Self { work_to_do }
    }
}

impl Default for ContentiousThreads {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for ContentiousThreads {
    fn name(&self) -> &str {
        "contentious_threads"
    }

    fn callback_index(&self) -> Option<usize> {
        Some(1)
    }

    fn prepare(&self, args: &Args) -> Result<Work, CallError> {
        let phrase = required_phrase(args, 0, "phrase")?;
        let n = self.work_to_do;

        Ok(Box::new(move || {
            require_rawr(&phrase)?;
            contended_work(n)?;
            Ok(Value::from(format!(
                "{}...threads are locked and contending with each other",
                phrase
            )))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{call_async, call_sync};
    use skel_runtime::{EventLoop, PoolConfig};
    use skel_types::ErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_busy_output() {
        let out = call_sync(&BusyThreads::with_work(1_000), &Args::new().with("rawr")).unwrap();
        assert_eq!(out, Value::from("rawr...threads are busy bees"));
    }

    #[test]
    fn test_contentious_output() {
        let out = call_sync(&ContentiousThreads::with_work(1_000), &Args::new().with("rawr")).unwrap();
        assert_eq!(
            out,
            Value::from("rawr...threads are locked and contending with each other")
        );
    }

    #[test]
    fn test_phrase_checks() {
        let err = call_sync(&BusyThreads::new(), &Args::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);

        let err = call_sync(&ContentiousThreads::new(), &Args::new().with("")).unwrap_err();
        assert_eq!(err.message(), "arg 'phrase' must be a non-empty string");
    }

    #[tokio::test]
    async fn test_domain_error_arrives_through_callback() {
        let lp = EventLoop::new(PoolConfig::new(2).unwrap()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for op in [&BusyThreads::with_work(10) as &dyn Operation, &ContentiousThreads::with_work(10)] {
            let seen = Rc::clone(&seen);
            let args = Args::new()
                .with("purr")
                .with_callback(move |outcome| seen.borrow_mut().push(outcome));
            call_async(&lp, op, args).unwrap();
        }

        assert_eq!(lp.run().await, 2);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen
            .iter()
            .all(|o| o.as_ref().is_err_and(|e| e.kind() == ErrorKind::Domain)));
    }
}
