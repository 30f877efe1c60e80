use skel_runtime::Work;
use skel_types::{CallError, OptionKind, OptionSpec, OptionsSchema, Value};

use crate::args::{required_phrase, Args};
use crate::dispatcher::Operation;
use crate::ops::work::{require_rawr, sleep_ms};

/// Milliseconds slept when no `sleep` option is given
pub const DEFAULT_SLEEP_MS: u64 = 100;

const OPTIONS: OptionsSchema = OptionsSchema::required(
    "arg 'options' must be an object",
    &[OptionSpec::new(
        "sleep",
        OptionKind::PositiveInt,
        "option 'sleep' must be a positive integer",
    )],
);

/// `sleepyThreads(phrase, options, callback)`: holds a worker without using CPU
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepyThreads;

impl Operation for SleepyThreads {
    fn name(&self) -> &str {
        "sleepy_threads"
    }

    fn callback_index(&self) -> Option<usize> {
        Some(2)
    }

    fn prepare(&self, args: &Args) -> Result<Work, CallError> {
        let phrase = required_phrase(args, 0, "phrase")?;
        let options = OPTIONS.validate(args.value(1))?;
        let sleep = options.positive_int("sleep").unwrap_or(DEFAULT_SLEEP_MS);

        Ok(Box::new(move || {
            require_rawr(&phrase)?;
            sleep_ms(sleep);
            Ok(Value::from(format!("{} zzzZZZ", phrase)))
        }))
    }
}
