//! Property tests for composite validation.
//!
//! Units are generated as (verdict, messages) pairs over a small key space so
//! that key collisions between units are common.

mod support;

use std::sync::atomic::Ordering;

use proptest::prelude::*;
use privacy_export::validation::{CompositeValidator, Messages, Validator};
use serde_json::{Value, json};
use support::ScriptedValidator;

fn arb_messages() -> impl Strategy<Value = Messages> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["email", "type", "customer_id", "address"]),
            prop::collection::vec("[a-z ]{1,12}", 1..3),
        ),
        0..3,
    )
    .prop_map(|entries| {
        let mut messages = Messages::new();
        for (key, values) in entries {
            messages
                .entry(key.to_string())
                .or_default()
                .extend(values);
        }
        messages
    })
}

fn arb_units() -> impl Strategy<Value = Vec<(bool, Messages)>> {
    prop::collection::vec((any::<bool>(), arb_messages()), 0..6)
}

fn composite(units: &[(bool, Messages)]) -> CompositeValidator<Value> {
    CompositeValidator::new(
        units
            .iter()
            .map(|(verdict, messages)| {
                Box::new(ScriptedValidator::from_messages(*verdict, messages.clone()))
                    as Box<dyn Validator<Value>>
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn test_verdict_is_all_valid_and_no_messages(units in arb_units()) {
        let mut validator = composite(&units);

        let expected = units.iter().all(|(verdict, _)| *verdict)
            && units.iter().all(|(_, messages)| messages.is_empty());

        prop_assert_eq!(validator.is_valid(&json!({})), expected);
    }

    #[test]
    fn test_merged_messages_concatenate_per_key_in_unit_order(units in arb_units()) {
        let mut validator = composite(&units);
        validator.is_valid(&json!({}));

        let mut expected = Messages::new();
        for (_, messages) in &units {
            for (key, values) in messages {
                expected.entry(key.clone()).or_default().extend(values.iter().cloned());
            }
        }

        prop_assert_eq!(validator.messages(), &expected);
    }

    #[test]
    fn test_each_unit_is_evaluated_exactly_once(units in arb_units()) {
        let scripted: Vec<ScriptedValidator> = units
            .iter()
            .map(|(verdict, messages)| ScriptedValidator::from_messages(*verdict, messages.clone()))
            .collect();
        let counters: Vec<_> = scripted.iter().map(ScriptedValidator::calls).collect();
        let mut validator = CompositeValidator::new(
            scripted
                .into_iter()
                .map(|unit| Box::new(unit) as Box<dyn Validator<Value>>)
                .collect(),
        );

        validator.is_valid(&json!({}));

        for counter in counters {
            prop_assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_repeated_calls_do_not_accumulate(units in arb_units()) {
        let mut validator = composite(&units);

        let first = validator.is_valid(&json!({}));
        let first_messages = validator.messages().clone();
        let second = validator.is_valid(&json!({}));

        prop_assert_eq!(first, second);
        prop_assert_eq!(validator.messages(), &first_messages);
    }

    #[test]
    fn test_empty_composite_is_always_valid(value in any::<i64>()) {
        let mut validator = CompositeValidator::<Value>::new(Vec::new());
        prop_assert!(validator.is_valid(&json!(value)));
        prop_assert!(validator.messages().is_empty());
    }
}
