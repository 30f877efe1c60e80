use skel_types::{CallError, Value};

use crate::args::{Arg, Args};

/// Object that remembers a name and says it back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloObject {
    name: String,
}

impl HelloObject {
    /// Build from call arguments; the first must be a non-empty string.
    pub fn new(args: &Args) -> Result<Self, CallError> {
        match args.get(0) {
            None | Some(Arg::Value(Value::Undefined)) => {
                Err(CallError::construction("must provide string arg"))
            }
            Some(arg) => Ok(Self { name: name_arg(arg)? }),
        }
    }

    pub fn named(name: impl Into<String>) -> Result<Self, CallError> {
        Self::new(&Args::new().with(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hello(&self) -> Value {
        Value::from(self.name.as_str())
    }
}

/// Object name validation shared by the object constructors.
pub(crate) fn name_arg(arg: &Arg) -> Result<String, CallError> {
    match arg {
        Arg::Value(Value::String(s)) if s.is_empty() => {
            Err(CallError::construction("arg must be a non-empty string"))
        }
        Arg::Value(Value::String(s)) => Ok(s.clone()),
        _ => Err(CallError::construction("arg must be a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skel_types::ErrorKind;

    #[test]
    fn test_hello_returns_name() {
        let h = HelloObject::new(&Args::new().with("carol")).unwrap();
        assert_eq!(h.hello(), Value::from("carol"));
        assert_eq!(h.name(), "carol");
    }

    #[test]
    fn test_construction_errors() {
        let cases = [
            (Args::new(), "must provide string arg"),
            (Args::new().with(""), "arg must be a non-empty string"),
            (Args::new().with(24), "arg must be a string"),
            (Args::new().with_callback(|_| {}), "arg must be a string"),
        ];
        for (args, message) in cases {
            let err = HelloObject::new(&args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Construction);
            assert_eq!(err.message(), message);
        }
    }

    #[test]
    fn test_hello_is_idempotent() {
        let h = HelloObject::named("carol").unwrap();
        assert_eq!(h.hello(), h.hello());
    }
}
