//! Options bag validation
//!
//! An options argument is a mapping of recognised keys to typed values.
//! Every recognised key that is present must match its declared kind;
//! keys the schema does not name are ignored.

use std::collections::HashMap;

use crate::error::CallError;
use crate::value::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────────────────────────────────────

/// Declared type of an option key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    String,
    /// Any finite number
    Number,
    /// Integer >= 1 (integral floats accepted)
    PositiveInt,
}

impl OptionKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            OptionKind::Bool => matches!(value, Value::Bool(_)),
            OptionKind::String => matches!(value, Value::String(_)),
            OptionKind::Number => value.as_f64().is_some_and(f64::is_finite),
            OptionKind::PositiveInt => positive_int(value).is_some(),
        }
    }
}

/// Integer >= 1 as u64; integral floats past `i64::MAX` saturate at `u64::MAX`
fn positive_int(value: &Value) -> Option<u64> {
    match value {
        Value::Int(i) => u64::try_from(*i).ok().filter(|n| *n >= 1),
        Value::Float(f) if f.fract() == 0.0 && *f >= 1.0 => Some(*f as u64),
        _ => None,
    }
}

/// A recognised option key
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub key: &'static str,
    pub kind: OptionKind,
    /// Error reported when the key is present with the wrong type
    pub message: &'static str,
}

impl OptionSpec {
    pub const fn new(key: &'static str, kind: OptionKind, message: &'static str) -> Self {
        Self { key, kind, message }
    }
}

/// Schema for one operation's options argument
#[derive(Debug, Clone, Copy)]
pub struct OptionsSchema {
    specs: &'static [OptionSpec],
    /// Error reported when the argument is not a mapping
    not_object: &'static str,
    /// Whether an absent argument is rejected
    required: bool,
}

impl OptionsSchema {
    /// Schema whose options argument must be present
    pub const fn required(not_object: &'static str, specs: &'static [OptionSpec]) -> Self {
        Self {
            specs,
            not_object,
            required: true,
        }
    }

    /// Schema whose options argument may be omitted entirely
    pub const fn optional(not_object: &'static str, specs: &'static [OptionSpec]) -> Self {
        Self {
            specs,
            not_object,
            required: false,
        }
    }

    pub fn specs(&self) -> &'static [OptionSpec] {
        self.specs
    }

    /// Validate an options argument against this schema
    pub fn validate(&self, value: Option<&Value>) -> Result<Options, CallError> {
        let fields = match value {
            None | Some(Value::Undefined) if !self.required => return Ok(Options::default()),
            Some(Value::Object(fields)) => fields,
            _ => return Err(CallError::validation(self.not_object)),
        };

        let mut values = HashMap::new();
        for spec in self.specs {
            let Some(v) = fields.get(spec.key) else {
                continue;
            };
            if !spec.kind.accepts(v) {
                return Err(CallError::validation(spec.message));
            }
            values.insert(spec.key, v.clone());
        }

        Ok(Options { values })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Validated Options
// ─────────────────────────────────────────────────────────────────────────────

/// Options that passed schema validation
///
/// Only recognised keys are retained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    values: HashMap<&'static str, Value>,
}

impl Options {
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn positive_int(&self, key: &str) -> Option<u64> {
        self.values.get(key).and_then(positive_int)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SPECS: &[OptionSpec] = &[
        OptionSpec::new("louder", OptionKind::Bool, "option 'louder' must be a boolean"),
        OptionSpec::new("sleep", OptionKind::PositiveInt, "option 'sleep' must be a positive integer"),
        OptionSpec::new("phrase", OptionKind::String, "options.phrase must be a string"),
        OptionSpec::new("multiply", OptionKind::Number, "options.multiply must be a number"),
    ];

    const REQUIRED: OptionsSchema = OptionsSchema::required("arg 'options' must be an object", SPECS);
    const OPTIONAL: OptionsSchema = OptionsSchema::optional("options must be an object", SPECS);

    #[test]
    fn test_valid_options() {
        let v = Value::object_from_pairs([
            ("louder", Value::from(true)),
            ("sleep", Value::from(2)),
            ("phrase", Value::from("Waka")),
            ("multiply", Value::from(2.5)),
        ]);
        let opts = REQUIRED.validate(Some(&v)).unwrap();
        assert_eq!(opts.bool("louder"), Some(true));
        assert_eq!(opts.positive_int("sleep"), Some(2));
        assert_eq!(opts.string("phrase"), Some("Waka"));
        assert_eq!(opts.number("multiply"), Some(2.5));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let v = Value::object_from_pairs([("colour", Value::from("blue"))]);
        let opts = REQUIRED.validate(Some(&v)).unwrap();
        assert!(opts.is_empty());
        assert!(!opts.contains("colour"));
    }

    #[test]
    fn test_wrong_type_names_key() {
        let v = Value::object_from_pairs([("louder", Value::from(3))]);
        let err = REQUIRED.validate(Some(&v)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("louder"));
    }

    #[test]
    fn test_positive_int_beyond_i64() {
        let v = Value::object_from_pairs([("sleep", u64::MAX)]);
        let opts = REQUIRED.validate(Some(&v)).unwrap();
        assert_eq!(opts.positive_int("sleep"), Some(u64::MAX));

        let inf = Value::object_from_pairs([("sleep", f64::INFINITY)]);
        assert!(REQUIRED.validate(Some(&inf)).is_err());
    }

    #[test]
    fn test_positive_int_rejects_zero_fraction_and_text() {
        for bad in [Value::from(0), Value::from(-3), Value::from(1.5), Value::from("hi")] {
            let v = Value::object_from_pairs([("sleep", bad)]);
            let err = REQUIRED.validate(Some(&v)).unwrap_err();
            assert_eq!(err.message(), "option 'sleep' must be a positive integer");
        }
    }

    #[test]
    fn test_not_object() {
        let err = REQUIRED.validate(Some(&Value::from(true))).unwrap_err();
        assert_eq!(err.message(), "arg 'options' must be an object");

        let err = REQUIRED.validate(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = OPTIONAL.validate(Some(&Value::from("not an object"))).unwrap_err();
        assert_eq!(err.message(), "options must be an object");
    }

    #[test]
    fn test_optional_absent() {
        assert!(OPTIONAL.validate(None).unwrap().is_empty());
        assert!(OPTIONAL.validate(Some(&Value::Undefined)).unwrap().is_empty());
        // explicit null is not an omitted argument
        assert!(OPTIONAL.validate(Some(&Value::Null)).is_err());
    }
}
