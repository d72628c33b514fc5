//! Nested records and sequences of records.

use nebula_rules::{Field, RecordView, Validator, ValidatorConfig, Value, record};
use pretty_assertions::assert_eq;

use crate::{check, field};

record! {
    #[derive(Debug, Clone, Default)]
    struct Address {
        city: String => ("city", "required|alpha"),
        zip: String => ("zipCode", "required|numeric"),
    }
}

record! {
    #[derive(Debug, Clone, Default)]
    struct Customer {
        name: String => ("name", "required"),
        address: Address => ("address", "_"),
        billing: Option<Address> => ("billing", "_"),
        shipping: Option<Address> => ("shipping", "required"),
        previous: Vec<Address> => ("previousAddresses", "_"),
    }
}

fn accra() -> Address {
    Address {
        city: "Accra".into(),
        zip: "00233".into(),
    }
}

#[tokio::test]
async fn nested_violations_become_nested_reports() {
    let customer = Customer {
        name: "Esi".into(),
        address: Address {
            city: "Accra".into(),
            zip: "GA-1".into(),
        },
        billing: None,
        shipping: Some(accra()),
        previous: vec![],
    };
    let report = Validator::default().validate(&customer).await.unwrap();

    assert_eq!(report.len(), 1);
    let violation = report.get("address").unwrap();
    assert_eq!(violation.key, "nested");
    let nested = violation.detail.as_nested().unwrap();
    assert_eq!(
        nested.message("zipCode"),
        Some("The zip code field may only contain digits.")
    );
    assert!(!nested.contains("city"));
}

#[tokio::test]
async fn unset_optional_record_is_only_checked_by_required() {
    let customer = Customer {
        name: "Esi".into(),
        address: accra(),
        billing: None,
        shipping: None,
        previous: vec![],
    };
    let report = Validator::default().validate(&customer).await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(
        report.message("shipping"),
        Some("The shipping field is required.")
    );
}

#[tokio::test]
async fn only_failing_elements_are_listed() {
    let customer = Customer {
        name: "Esi".into(),
        address: accra(),
        billing: None,
        shipping: Some(accra()),
        previous: vec![
            accra(),
            Address {
                city: "Kumasi 2".into(),
                zip: "00233".into(),
            },
            accra(),
        ],
    };
    let report = Validator::default().validate(&customer).await.unwrap();

    let violation = report.get("previousAddresses").unwrap();
    assert_eq!(violation.key, "elements");
    let items = violation.detail.as_list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].as_nested().unwrap().message("city"),
        Some("The city field may only contain letters.")
    );
}

#[tokio::test]
async fn nested_report_serializes_as_object() {
    let customer = Customer {
        name: String::new(),
        address: Address {
            city: "Accra".into(),
            zip: String::new(),
        },
        shipping: Some(accra()),
        ..Customer::default()
    };
    let report = Validator::default().validate(&customer).await.unwrap();
    assert_eq!(
        report.to_json(),
        serde_json::json!({
            "name": "The name field is required.",
            "address": { "zipCode": "The zip code field is required." },
        })
    );
}

#[tokio::test]
async fn depth_limit_turns_into_a_fault() {
    let leaf = RecordView::from_fields(vec![field("code", "x", "numeric")]);
    let middle = RecordView::from_fields(vec![field("leaf", Value::record(&leaf), "_")]);
    let root = RecordView::from_fields(vec![field("middle", Value::record(&middle), "_")]);

    let validator = Validator::new(ValidatorConfig::default().with_max_depth(1)).unwrap();
    let report = validator.validate(&root).await.unwrap();

    let middle_report = report.get("middle").unwrap().detail.as_nested().unwrap();
    assert_eq!(middle_report.get("leaf").unwrap().key, "fault");

    let report = Validator::default().validate(&root).await.unwrap();
    let middle_report = report.get("middle").unwrap().detail.as_nested().unwrap();
    let leaf_report = middle_report.get("leaf").unwrap().detail.as_nested().unwrap();
    assert_eq!(leaf_report.get("code").unwrap().key, "numeric");
}

#[tokio::test]
async fn dynamic_optional_record_is_accepted() {
    let inner = RecordView::from_fields(vec![
        Field::new("note", "hi").wire("note"),
        field("count", 3i64, "min:5"),
    ]);
    let report = Validator::default()
        .validate_value(&Value::Optional(Some(Box::new(Value::record(&inner)))))
        .await
        .unwrap();
    assert_eq!(
        report.message("count"),
        Some("The count field must be at least 5.")
    );

    let report = check(vec![field(
        "inner",
        Value::Optional(Some(Box::new(Value::record(&inner)))),
        "_",
    )])
    .await;
    assert_eq!(report.get("inner").unwrap().key, "nested");
}

#[tokio::test]
async fn slice_bound_within_limits_still_checks_elements() {
    let item = RecordView::from_fields(vec![
        Field::new("sku", "A-1").wire("sku"),
        field("zip", "", "required"),
    ]);
    let items = Value::List(vec![Value::record(&item)]);

    let report = check(vec![
        field("items", items.clone(), "slice:max:5"),
        field("bundle", items, "slice:min:3"),
    ])
    .await;

    let listed = report.get("items").unwrap().detail.as_list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(
        listed[0].as_nested().unwrap().message("zip"),
        Some("The zip field is required.")
    );
    assert_eq!(report.get("bundle").unwrap().key, "min.slice");
}
