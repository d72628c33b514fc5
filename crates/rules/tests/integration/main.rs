//! Integration tests for nebula-rules: whole validation calls through the
//! public API.

mod engine;
mod files;
mod messages;
mod nested;

use nebula_rules::{Field, RecordView, Report, Validator, Value};

/// A validated field.
pub fn field(label: &'static str, value: impl Into<Value>, rules: &'static str) -> Field {
    Field::new(label, value).wire(label).rules(rules)
}

/// Validates a record built from `fields` with the default validator.
pub async fn check(fields: Vec<Field>) -> Report {
    Validator::default()
        .validate(&RecordView::from_fields(fields))
        .await
        .expect("validation call failed")
}
