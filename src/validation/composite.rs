//! Composite validation: one verdict from many units.

use super::{MessageAccumulator, Messages, Validator};

/// Runs an ordered set of validator units against a single value.
///
/// Every unit is evaluated on every call, even after an earlier unit has
/// rejected the value, so the merged message set always covers the full
/// report. Messages from all units are deep-merged in unit order.
///
/// The value is valid only when every unit accepted it *and* no unit left a
/// message behind. The second condition catches units that accept a value
/// while still reporting problems about it.
pub struct CompositeValidator<T: ?Sized> {
    validators: Vec<Box<dyn Validator<T>>>,
    accumulator: MessageAccumulator,
}

impl<T: ?Sized> CompositeValidator<T> {
    pub fn new(validators: Vec<Box<dyn Validator<T>>>) -> Self {
        Self {
            validators,
            accumulator: MessageAccumulator::new(),
        }
    }

    /// Number of configured units.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Drop the messages of the last evaluation.
    pub fn clear_messages(&mut self) {
        self.accumulator.clear();
    }

    /// Take ownership of the messages of the last evaluation.
    pub fn take_messages(&mut self) -> Messages {
        self.accumulator.take()
    }
}

impl<T: ?Sized> Validator<T> for CompositeValidator<T> {
    fn is_valid(&mut self, value: &T) -> bool {
        self.accumulator.clear();

        let mut all_valid = true;
        for validator in &mut self.validators {
            // Evaluate first: `&&` would skip the remaining units.
            let valid = validator.is_valid(value);
            all_valid &= valid;
            self.accumulator.add_messages(validator.messages());
        }

        let valid = all_valid && !self.accumulator.has_messages();
        tracing::debug!(
            validators = self.validators.len(),
            valid,
            message_keys = self.accumulator.messages().len(),
            "composite validation finished"
        );
        valid
    }

    fn messages(&self) -> &Messages {
        self.accumulator.messages()
    }
}

impl<T: ?Sized> std::fmt::Debug for CompositeValidator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeValidator")
            .field("validators", &self.validators.len())
            .field("messages", self.accumulator.messages())
            .finish()
    }
}
