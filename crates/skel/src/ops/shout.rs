use skel_runtime::Work;
use skel_types::{CallError, OptionKind, OptionSpec, OptionsSchema, Value};

use crate::args::{required_phrase, Args};
use crate::dispatcher::Operation;
use crate::ops::work::require_rawr;

/// Suffix without `louder`
pub const QUIET: &str = "!";
/// Suffix with `louder`
pub const LOUD: &str = "!!!!!";

const OPTIONS: OptionsSchema = OptionsSchema::required(
    "arg 'options' must be an object",
    &[OptionSpec::new("louder", OptionKind::Bool, "option 'louder' must be a boolean")],
);

/// `shout(phrase, options, callback)`
#[derive(Debug, Default, Clone, Copy)]
pub struct Shout;

impl Operation for Shout {
    fn name(&self) -> &str {
        "shout"
    }

    fn callback_index(&self) -> Option<usize> {
        Some(2)
    }

    fn prepare(&self, args: &Args) -> Result<Work, CallError> {
        let phrase = required_phrase(args, 0, "phrase")?;
        let options = OPTIONS.validate(args.value(1))?;
        let louder = options.bool("louder").unwrap_or(false);

        Ok(Box::new(move || {
            require_rawr(&phrase)?;
            Ok(Value::from(shout(&phrase, louder)))
        }))
    }
}

pub fn shout(phrase: &str, louder: bool) -> String {
    let suffix = if louder { LOUD } else { QUIET };
    format!("{}{}", phrase, suffix)
}
