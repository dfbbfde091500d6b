//! Field-level validator units over JSON objects.
//!
//! Each unit inspects one field of a `serde_json::Value` object and reports
//! its messages under the field name, so several units checking the same
//! field end up merged under one key by the composite.

use super::{MessageAccumulator, Messages, Validator};
use indexmap::IndexSet;
use regex::Regex;
use serde_json::Value;

fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_object().and_then(|object| object.get(name))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Requires a field to be present and non-empty.
#[derive(Debug, Clone)]
pub struct RequiredFieldValidator {
    field: String,
    accumulator: MessageAccumulator,
}

impl RequiredFieldValidator {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            accumulator: MessageAccumulator::new(),
        }
    }
}

impl Validator<Value> for RequiredFieldValidator {
    fn is_valid(&mut self, value: &Value) -> bool {
        self.accumulator.clear();
        match field(value, &self.field) {
            Some(v) if !is_blank(v) => true,
            _ => {
                self.accumulator
                    .add_message(&self.field, format!("\"{}\" is required", self.field));
                false
            }
        }
    }

    fn messages(&self) -> &Messages {
        self.accumulator.messages()
    }
}

/// Requires a field, when present, to be a string matching a pattern.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    field: String,
    pattern: Regex,
    accumulator: MessageAccumulator,
}

impl PatternValidator {
    pub fn new(field: impl Into<String>, pattern: Regex) -> Self {
        Self {
            field: field.into(),
            pattern,
            accumulator: MessageAccumulator::new(),
        }
    }

    /// Compile `pattern` and build the unit.
    pub fn from_pattern(field: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(field, Regex::new(pattern)?))
    }
}

impl Validator<Value> for PatternValidator {
    fn is_valid(&mut self, value: &Value) -> bool {
        self.accumulator.clear();
        match field(value, &self.field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) if self.pattern.is_match(s) => true,
            Some(Value::String(s)) => {
                self.accumulator.add_message(
                    &self.field,
                    format!(
                        "\"{}\" value \"{}\" does not match {}",
                        self.field,
                        s,
                        self.pattern.as_str()
                    ),
                );
                false
            }
            Some(_) => {
                self.accumulator
                    .add_message(&self.field, format!("\"{}\" must be a string", self.field));
                false
            }
        }
    }

    fn messages(&self) -> &Messages {
        self.accumulator.messages()
    }
}

/// Requires a field, when present, to be one of a fixed set of strings.
#[derive(Debug, Clone)]
pub struct AllowedValuesValidator {
    field: String,
    allowed: IndexSet<String>,
    accumulator: MessageAccumulator,
}

impl AllowedValuesValidator {
    pub fn new<I, S>(field: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field: field.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
            accumulator: MessageAccumulator::new(),
        }
    }
}

impl Validator<Value> for AllowedValuesValidator {
    fn is_valid(&mut self, value: &Value) -> bool {
        self.accumulator.clear();
        match field(value, &self.field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) if self.allowed.contains(s) => true,
            Some(other) => {
                let allowed = self
                    .allowed
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                self.accumulator.add_message(
                    &self.field,
                    format!(
                        "\"{}\" value {} is not one of: {}",
                        self.field, other, allowed
                    ),
                );
                false
            }
        }
    }

    fn messages(&self) -> &Messages {
        self.accumulator.messages()
    }
}
