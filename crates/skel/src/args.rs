//! Positional call arguments.
//!
//! Arguments are untyped: any position may hold a value or a callback, and
//! it is up to each operation to check that the right thing is where it
//! expects it.

use std::fmt;

use skel_runtime::{Callback, Outcome};
use skel_types::{CallError, Value};

/// A single positional argument
pub enum Arg {
    Value(Value),
    Callback(Callback),
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Arg::Callback(_) => write!(f, "[Function]"),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

/// Ordered argument list
#[derive(Debug, Default)]
pub struct Args(Vec<Arg>);

impl Args {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a value argument
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.0.push(Arg::Value(value.into()));
        self
    }

    /// Append a callback argument
    pub fn with_callback<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Outcome) + 'static,
    {
        self.0.push(Arg::Callback(Box::new(f)));
        self
    }

    pub fn push(&mut self, arg: Arg) {
        self.0.push(arg);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.0.get(index)
    }

    /// Value at `index`, or `None` if missing or a callback
    pub fn value(&self, index: usize) -> Option<&Value> {
        match self.0.get(index) {
            Some(Arg::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// Whether `index` holds an invocable callback
    pub fn is_callback(&self, index: usize) -> bool {
        matches!(self.0.get(index), Some(Arg::Callback(_)))
    }

    /// Remove the callback at `index`, leaving `Undefined` in its place.
    ///
    /// Fails with an invocation error when the position is empty or holds
    /// a plain value.
    pub fn take_callback(&mut self, index: usize) -> Result<Callback, CallError> {
        let taken = self
            .0
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, Arg::Value(Value::Undefined)));

        match taken {
            Some(Arg::Callback(cb)) => Ok(cb),
            other => {
                if let Some(value) = other {
                    self.0[index] = value;
                }
                Err(CallError::invocation(format!(
                    "{} arg 'callback' must be a function",
                    ordinal(index)
                )))
            }
        }
    }
}

impl FromIterator<Arg> for Args {
    fn from_iter<I: IntoIterator<Item = Arg>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// English ordinal for an argument position
pub(crate) fn ordinal(index: usize) -> &'static str {
    match index {
        0 => "first",
        1 => "second",
        2 => "third",
        3 => "fourth",
        _ => "trailing",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Common argument checks
// ─────────────────────────────────────────────────────────────────────────────

/// Required non-empty string argument named `label`.
pub(crate) fn required_phrase(args: &Args, index: usize, label: &str) -> Result<String, CallError> {
    match args.value(index) {
        Some(Value::String(s)) if s.is_empty() => Err(CallError::construction(format!(
            "arg '{}' must be a non-empty string",
            label
        ))),
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(CallError::construction(format!(
            "arg '{}' must be a string",
            label
        ))),
    }
}
