use skel_runtime::Work;
use skel_types::{CallError, OptionKind, OptionSpec, OptionsSchema, Value};

use crate::args::Args;
use crate::dispatcher::Operation;
use crate::ops::work::{expensive_work, WORK_TO_DO};

/// Suffix appended by `helloAsync` with `louder`
pub const LOUD: &str = "!!!!";

const OPTIONS: OptionsSchema = OptionsSchema::required(
    "first arg 'options' must be an object",
    &[
        OptionSpec::new("louder", OptionKind::Bool, "option 'louder' must be a boolean"),
        OptionSpec::new("buffer", OptionKind::Bool, "option 'buffer' must be a boolean"),
    ],
);

/// `hello()`
#[derive(Debug, Default, Clone, Copy)]
pub struct Hello;

impl Operation for Hello {
    fn name(&self) -> &str {
        "hello"
    }

    fn prepare(&self, _args: &Args) -> Result<Work, CallError> {
        Ok(Box::new(|| Ok(Value::from("hello world"))))
    }
}

/// `wave()`
#[derive(Debug, Default, Clone, Copy)]
pub struct Wave;

impl Operation for Wave {
    fn name(&self) -> &str {
        "wave"
    }

    fn prepare(&self, _args: &Args) -> Result<Work, CallError> {
        Ok(Box::new(|| Ok(Value::from("howdy world!"))))
    }
}

/// `helloAsync(options, callback)`
///
/// Builds the ordered map on a worker, then answers with `greeting`.
/// With `buffer: true` the answer is delivered as raw bytes.
#[derive(Debug, Clone)]
pub struct HelloAsync {
    greeting: String,
    work_to_do: usize,
}

impl HelloAsync {
    pub fn new() -> Self {
        Self::with_greeting("...threads are busy bees...world")
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            work_to_do: WORK_TO_DO,
        }
    }

    pub fn with_work(mut self, work_to_do: usize) -> Self {
        self.work_to_do = work_to_do;
        self
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }
}

impl Default for HelloAsync {
    fn default() -> Self {
        Self::new()
    }
}

impl Operation for HelloAsync {
    fn name(&self) -> &str {
        "hello_async"
    }

    fn callback_index(&self) -> Option<usize> {
        Some(1)
    }

    fn prepare(&self, args: &Args) -> Result<Work, CallError> {
        let options = OPTIONS.validate(args.value(0))?;
        let louder = options.bool("louder").unwrap_or(false);
        let buffer = options.bool("buffer").unwrap_or(false);
        let greeting = self.greeting.clone();
        let n = self.work_to_do;

        Ok(Box::new(move || {
            expensive_work(n)?;
            let mut result = greeting;
            if louder {
                result.push_str(LOUD);
            }
            Ok(if buffer {
                Value::Buffer(result.into_bytes())
            } else {
                Value::String(result)
            })
        }))
    }
}
