use skel_runtime::Work;
use skel_types::{CallError, OptionKind, OptionSpec, OptionsSchema, Value};

use crate::args::Args;
use crate::dispatcher::Operation;

pub const DEFAULT_PHRASE: &str = "hello";
pub const DEFAULT_MULTIPLY: u32 = 1;
pub const MAX_MULTIPLY: u32 = i32::MAX as u32;

const NOT_OBJECT: &str = "options must be an object";

const OPTIONS: OptionsSchema = OptionsSchema::optional(
    NOT_OBJECT,
    &[
        OptionSpec::new("phrase", OptionKind::String, "options.phrase must be a string"),
        OptionSpec::new("multiply", OptionKind::Number, "options.multiply must be a number"),
    ],
);

/// `helloPromise(options?)`: repeats `phrase` `multiply` times
#[derive(Debug, Default, Clone, Copy)]
pub struct HelloPromise;

impl Operation for HelloPromise {
    fn name(&self) -> &str {
        "hello_promise"
    }

    fn prepare(&self, args: &Args) -> Result<Work, CallError> {
        if args.is_callback(0) {
            return Err(CallError::validation(NOT_OBJECT));
        }
        let options = OPTIONS.validate(args.value(0))?;

        let phrase = options.string("phrase").unwrap_or(DEFAULT_PHRASE).to_string();
        let multiply = match options.number("multiply") {
            Some(n) if n < 1.0 => {
                return Err(CallError::validation("options.multiply must be 1 or greater"));
            }
            Some(n) if n >= f64::from(MAX_MULTIPLY) + 1.0 => {
                return Err(CallError::validation(format!(
                    "options.multiply must be {} or less",
                    MAX_MULTIPLY
                )));
            }
            // fractional counts are truncated
            Some(n) => n as u32,
            None => DEFAULT_MULTIPLY,
        };

        Ok(Box::new(move || repeat(&phrase, multiply as usize).map(Value::from)))
    }
}

/// `phrase` repeated `count` times, failing instead of aborting when the
/// result cannot be allocated
fn repeat(phrase: &str, count: usize) -> Result<String, CallError> {
    let len = phrase
        .len()
        .checked_mul(count)
        .ok_or_else(|| CallError::runtime("options.multiply is too large for the phrase"))?;

    let mut out = String::new();
    out.try_reserve_exact(len)
        .map_err(|e| CallError::runtime(format!("could not allocate {} bytes: {}", len, e)))?;
    for _ in 0..count {
        out.push_str(phrase);
    }
    Ok(out)
}
