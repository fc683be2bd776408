//! Value and error maps shared by the form-state engine and the orchestrator.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::meta::FieldMeta;

/// The full set of field values, keyed by field name in declaration order.
pub type FormValues = Map<String, Value>;

/// Per-field error messages. `None` records a field that was validated and passed.
pub type FormErrors = BTreeMap<String, Option<String>>;

/// Computes the values a form starts with.
///
/// Every field contributes `default_value` (or the empty string) in
/// declaration order, then `overrides` is laid on top; override keys win on
/// collision and keys without a matching field are kept.
pub fn initial_values(fields: &[FieldMeta], overrides: &FormValues) -> FormValues {
    let mut values: FormValues = fields
        .iter()
        .map(|field| (field.name.clone(), field.initial_value()))
        .collect();
    for (key, value) in overrides {
        values.insert(key.clone(), value.clone());
    }
    values
}

/// Returns `true` if any entry carries an error message.
pub fn has_errors(errors: &FormErrors) -> bool {
    errors.values().any(Option::is_some)
}
