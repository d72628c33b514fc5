//! Locale selection, custom template stores and label formatting.

use std::collections::HashMap;
use std::sync::Arc;

use nebula_rules::{LocaleStore, RecordView, Report, Validator, ValidatorConfig};
use pretty_assertions::assert_eq;

use crate::field;

fn sample() -> RecordView {
    RecordView::from_fields(vec![
        field("firstName", "", "required"),
        field("email", "nope", "email"),
        field("age", 9i64, "min:18"),
        field("role", "root", "enum:admin,user"),
    ])
}

async fn validate_in(locale: &str) -> Report {
    Validator::builder()
        .locale(locale)
        .build()
        .unwrap()
        .validate(&sample())
        .await
        .unwrap()
}

#[tokio::test]
async fn french_templates() {
    let report = validate_in("fr").await;
    assert_eq!(
        report.message("firstName"),
        Some("Le champ first name est obligatoire.")
    );
    assert_eq!(
        report.message("email"),
        Some("Le champ email doit être une adresse e-mail valide.")
    );
    assert_eq!(
        report.message("role"),
        Some("Le champ role doit être l'une des valeurs suivantes : admin,user.")
    );
}

#[tokio::test]
async fn locale_is_case_insensitive_and_falls_back_to_english() {
    assert_eq!(validate_in("FR").await, validate_in("fr").await);

    let report = validate_in("de").await;
    assert_eq!(
        report.message("firstName"),
        Some("The first name field is required.")
    );
    assert_eq!(
        report.message("age"),
        Some("The age field must be at least 18.")
    );
}

#[tokio::test]
async fn locale_from_config() {
    let validator = Validator::new(ValidatorConfig::default().with_locale("fr")).unwrap();
    let report = validator.validate(&sample()).await.unwrap();
    assert_eq!(
        report.message("firstName"),
        Some("Le champ first name est obligatoire.")
    );
}

struct Shouting(HashMap<&'static str, &'static str>);

impl LocaleStore for Shouting {
    fn lookup(&self, _locale: &str, key: &str) -> Option<&str> {
        self.0.get(key).copied()
    }
}

#[tokio::test]
async fn missing_template_falls_back_to_key() {
    let store = Shouting(HashMap::from([("required", "{0} IS REQUIRED")]));
    let report = Validator::builder()
        .messages(Arc::new(store))
        .build()
        .unwrap()
        .validate(&sample())
        .await
        .unwrap();

    assert_eq!(report.message("firstName"), Some("first name IS REQUIRED"));
    assert_eq!(report.message("email"), Some("email"));
    assert_eq!(report.message("age"), Some("min.numeric"));
    assert_eq!(report.message("role"), Some("enum"));
}
