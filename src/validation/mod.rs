//! Validator units and their composition.
//!
//! A validator unit is anything that can judge a value and explain why it
//! rejected it. Units report their explanations as [`Messages`]: a mapping
//! from a key (usually a field name) to an ordered list of human readable
//! messages.
//!
//! - [`Validator`]: the capability every unit implements
//! - [`MessageAccumulator`]: the shared "messages so far" state units build on
//! - [`CompositeValidator`]: runs several units and merges their verdicts
//! - [`rules`]: field-level units over JSON payloads
//!
//! # Example
//!
//! ```rust
//! use privacy_export::validation::{CompositeValidator, Validator};
//! use privacy_export::validation::rules::{AllowedValuesValidator, RequiredFieldValidator};
//! use serde_json::json;
//!
//! let mut validator = CompositeValidator::new(vec![
//!     Box::new(RequiredFieldValidator::new("type")) as Box<dyn Validator<serde_json::Value>>,
//!     Box::new(AllowedValuesValidator::new("type", ["export", "erase"])),
//! ]);
//!
//! assert!(validator.is_valid(&json!({ "type": "export" })));
//! assert!(!validator.is_valid(&json!({ "type": "archive" })));
//! assert_eq!(validator.messages()["type"].len(), 1);
//! ```

pub mod composite;
pub mod rules;

pub use composite::CompositeValidator;

use indexmap::IndexMap;

/// Messages reported by a validator, keyed by field (or any other grouping
/// key). Keys keep first-seen order; each list keeps insertion order.
pub type Messages = IndexMap<String, Vec<String>>;

/// A single validation capability.
///
/// Units are expected to be free of side effects beyond their own message
/// state. The composite never resets a unit; a unit that wants fresh messages
/// per call clears them itself.
pub trait Validator<T: ?Sized>: Send {
    /// Judge `value`, recording any messages explaining a rejection.
    fn is_valid(&mut self, value: &T) -> bool;

    /// Messages recorded by the unit.
    fn messages(&self) -> &Messages;

    /// Whether the unit currently holds any message.
    fn has_messages(&self) -> bool {
        !self.messages().is_empty()
    }
}

/// Accumulated validation messages with a deep-merge policy.
///
/// Adding messages under a key that already exists appends to that key's
/// list instead of replacing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageAccumulator {
    messages: Messages,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single message under `key`.
    pub fn add_message(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(key.into())
            .or_default()
            .push(message.into());
    }

    /// Deep-merge `messages` into the accumulator.
    pub fn add_messages(&mut self, messages: &Messages) {
        for (key, values) in messages {
            self.messages
                .entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Total number of messages across all keys.
    pub fn len(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Remove and return every accumulated message.
    pub fn take(&mut self) -> Messages {
        std::mem::take(&mut self.messages)
    }
}

/// Flatten messages into `key: message` lines, in key order.
pub fn format_messages(messages: &Messages) -> Vec<String> {
    messages
        .iter()
        .flat_map(|(key, values)| values.iter().map(move |value| format!("{key}: {value}")))
        .collect()
}
