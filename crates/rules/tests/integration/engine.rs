//! Field evaluation, dispatch and aggregation.

use std::sync::Arc;
use std::time::Duration;

use nebula_rules::testing::{FailingUniqueness, MemoryUniqueness};
use nebula_rules::{
    ContentSniffer, DependencyPolicy, Field, FileUpload, RecordView, RulesError, Validator,
    ValidatorConfig, Value, record,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::{check, field};

record! {
    #[derive(Debug, Clone)]
    struct SignUp {
        name: String => ("name", "required|string|from:1,20"),
        email: String => ("email", "required|email"),
        role: String => ("role", "required|enum:admin,user"),
        password: String => ("password", "required|min:8"),
        confirm: String => ("confirmPassword", "required|same:password"),
        age: u32 => ("age", "from:18,120"),
        terms: bool => ("terms", "required"),
        nickname: String => ("nickname"),
        session: u64,
    }
}

fn valid_sign_up() -> SignUp {
    SignUp {
        name: "Kofi Mensah".into(),
        email: "kofi@mail.com".into(),
        role: "admin".into(),
        password: "correct-horse".into(),
        confirm: "correct-horse".into(),
        age: 34,
        terms: true,
        nickname: String::new(),
        session: 0,
    }
}

#[tokio::test]
async fn valid_record_produces_empty_report() {
    let report = Validator::default().validate(&valid_sign_up()).await.unwrap();
    assert!(report.is_empty(), "{report:?}");
}

#[tokio::test]
async fn every_failing_field_is_reported() {
    let sign_up = SignUp {
        email: "kofi".into(),
        role: "admins".into(),
        confirm: "correct-horse!".into(),
        age: 12,
        terms: false,
        ..valid_sign_up()
    };
    let report = Validator::default().validate(&sign_up).await.unwrap();

    assert_eq!(report.len(), 5);
    assert_eq!(
        report.message("email"),
        Some("The email field must be a valid email address.")
    );
    assert_eq!(
        report.message("role"),
        Some("The role field must be one of: admin,user.")
    );
    assert_eq!(
        report.message("confirmPassword"),
        Some("The confirm password field must match the password field.")
    );
    assert_eq!(
        report.message("age"),
        Some("The age field must be between 18 and 120.")
    );
    assert_eq!(report.get("terms").unwrap().key, "bool");
    assert_eq!(
        report.message("terms"),
        Some("The terms field must be accepted.")
    );
}

#[rstest]
#[case("required|string|from:1,5")]
#[case("string|from:1,5|required")]
#[case("string|required|from:1,5")]
#[tokio::test]
async fn required_wins_wherever_it_sits(#[case] chain: &'static str) {
    let report = check(vec![field("name", "", chain)]).await;
    assert_eq!(report.len(), 1);
    let violation = report.get("name").unwrap();
    assert_eq!(violation.key, "required");
    assert_eq!(report.message("name"), Some("The name field is required."));
}

#[tokio::test]
async fn empty_optional_field_without_required_passes() {
    let report = check(vec![
        field("bio", "", "string|min:10"),
        field("score", 0i64, "min:5"),
        field("tags", Value::List(vec![]), "slice:min:1"),
    ])
    .await;
    assert!(report.is_empty());
}

#[rstest]
#[case(1, true)]
#[case(2, false)]
#[case(3, false)]
#[case(4, false)]
#[case(5, true)]
#[tokio::test]
async fn between_excludes_its_bounds(#[case] n: i64, #[case] rejected: bool) {
    let report = check(vec![field("count", n, "between:1,5")]).await;
    assert_eq!(report.contains("count"), rejected);
}

#[rstest]
#[case(0, true)]
#[case(1, false)]
#[case(5, false)]
#[case(6, true)]
#[tokio::test]
async fn from_includes_its_bounds(#[case] n: u64, #[case] rejected: bool) {
    let chain = "from:1,5";
    // zero is the empty value for numbers and only `required` sees it
    let chain = if n == 0 { "required|from:1,5" } else { chain };
    let report = check(vec![field("count", n, chain)]).await;
    assert_eq!(report.contains("count"), rejected);
}

#[tokio::test]
async fn from_reports_numeric_and_string_messages() {
    let report = check(vec![
        field("count", 9i64, "from:1,5"),
        field("name", "abcdefg", "from:1,5"),
        field("ratio", 0.5, "between:1,5"),
    ])
    .await;
    assert_eq!(
        report.message("count"),
        Some("The count field must be between 1 and 5.")
    );
    assert_eq!(
        report.message("name"),
        Some("The name field must be between 1 and 5 characters.")
    );
    assert_eq!(report.get("ratio").unwrap().key, "between.numeric");
}

#[rstest]
#[case("user@localhost")]
#[case("user@localhost.com")]
#[case("user@example.com")]
#[case("a@example.com")]
#[tokio::test]
async fn blocked_email_domains_are_rejected(#[case] email: &'static str) {
    let report = check(vec![field("email", email, "required|email")]).await;
    assert_eq!(report.get("email").unwrap().key, "email");
}

#[rstest]
#[case("admin", false)]
#[case("user", false)]
#[case("admins", true)]
#[case("Admin", true)]
#[case("admin,user", true)]
#[tokio::test]
async fn enum_matches_whole_tokens(#[case] role: &'static str, #[case] rejected: bool) {
    let report = check(vec![field("role", role, "enum:admin,user")]).await;
    assert_eq!(report.contains("role"), rejected);
}

#[tokio::test]
async fn first_violation_stops_the_chain() {
    let report = check(vec![field("code", "ab!", "min:5|alpha|max:1")]).await;
    assert_eq!(report.get("code").unwrap().key, "min.string");
}

#[tokio::test]
async fn unknown_rules_are_ignored() {
    let report = check(vec![
        field("name", "Ama", "no_such_rule|int|alpha"),
        field("count", 12i64, "email|uint"),
        field("flag", true, "min:3|email"),
    ])
    .await;
    assert!(report.is_empty(), "{report:?}");
}

#[tokio::test]
async fn override_message_is_used_verbatim() {
    let report = check(vec![
        field("name", "", "required>Tell us your name"),
        field("code", "x1", "alpha>Letters only, please"),
    ])
    .await;
    assert_eq!(report.message("name"), Some("Tell us your name"));
    assert_eq!(report.message("code"), Some("Letters only, please"));
}

#[tokio::test]
async fn match_compares_against_sibling_without_parameters() {
    let report = check(vec![
        Field::new("pin", "1234").wire("pin"),
        field("pinAgain", "1243", "match:pin"),
    ])
    .await;
    assert_eq!(report.message("pinAgain"), Some("The pin again field does not match."));
}

#[tokio::test]
async fn same_with_unknown_sibling_is_a_fault() {
    let report = check(vec![
        field("confirm", "x", "same:missing"),
        field("name", "", "required"),
    ])
    .await;
    assert_eq!(report.get("confirm").unwrap().key, "fault");
    assert_eq!(report.get("name").unwrap().key, "required");
}

#[tokio::test]
async fn single_digit_uint_is_rejected() {
    let report = check(vec![
        field("one", 7u64, "uint"),
        field("two", 42u64, "uint"),
        field("signed", -3i64, "int"),
    ])
    .await;
    assert_eq!(report.get("one").unwrap().key, "uint");
    assert!(!report.contains("two"));
    assert!(!report.contains("signed"));
}

#[tokio::test]
async fn slice_bounds_count_elements() {
    let tags = Value::List(vec![Value::from("a")]);
    let report = check(vec![
        field("tags", tags.clone(), "slice:min:2"),
        field("labels", tags, "slice:max:1"),
    ])
    .await;
    assert_eq!(report.get("tags").unwrap().key, "min.slice");
    assert_eq!(
        report.message("tags"),
        Some("The tags field must have at least 2 items.")
    );
    assert!(!report.contains("labels"));
}

#[tokio::test]
async fn element_emails_are_checked_with_positions() {
    let emails = Value::List(vec![Value::from("ama@mail.com"), Value::from("nope")]);
    let report = check(vec![field("emails", emails, "email")]).await;
    let violation = report.get("emails").unwrap();
    let items = violation.detail.as_list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].as_message(),
        Some("The emails (2) field must be a valid email address.")
    );
}

// ============================================================================
// UNIQUENESS
// ============================================================================

fn unique_record(email: &'static str) -> RecordView {
    RecordView::from_fields(vec![field("email", email, "required|unique:users.emailAddress")])
}

#[tokio::test]
async fn unique_rejects_taken_values() {
    let store = MemoryUniqueness::new().with_value("users", "email_address", "taken@mail.com");
    let validator = Validator::builder()
        .uniqueness(Arc::new(store))
        .build()
        .unwrap();

    let report = validator.validate(&unique_record("taken@mail.com")).await.unwrap();
    assert_eq!(
        report.message("email"),
        Some("The email has already been taken.")
    );

    let report = validator.validate(&unique_record("free@mail.com")).await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn unique_without_checker_is_a_fault() {
    let report = Validator::default()
        .validate(&unique_record("a@mail.com"))
        .await
        .unwrap();
    assert_eq!(report.get("email").unwrap().key, "fault");
}

#[tokio::test]
async fn dependency_failure_aborts_by_default() {
    let validator = Validator::builder()
        .uniqueness(Arc::new(FailingUniqueness))
        .build()
        .unwrap();
    let err = validator
        .validate(&unique_record("a@mail.com"))
        .await
        .unwrap_err();
    match err {
        RulesError::Dependency { target, policy, .. } => {
            assert_eq!(target, "users.email_address");
            assert_eq!(policy, DependencyPolicy::Abort);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn dependency_failure_can_become_a_violation() {
    let validator = Validator::builder()
        .config(ValidatorConfig::default().with_dependency_policy(DependencyPolicy::Violation))
        .uniqueness(Arc::new(FailingUniqueness))
        .build()
        .unwrap();
    let mut fields = unique_record("a@mail.com").fields().to_vec();
    fields.push(field("name", "", "required"));

    let report = validator
        .validate(&RecordView::from_fields(fields))
        .await
        .unwrap();
    assert_eq!(report.get("email").unwrap().key, "unique");
    assert_eq!(report.get("name").unwrap().key, "required");
}

// ============================================================================
// CALL LEVEL
// ============================================================================

#[tokio::test]
async fn non_record_arguments_are_structural_errors() {
    let validator = Validator::default();
    for value in [
        Value::from("text"),
        Value::Int(3),
        Value::List(vec![]),
        Value::Optional(None),
    ] {
        let err = validator.validate_value(&value).await.unwrap_err();
        assert!(matches!(err, RulesError::Structural { .. }), "{err}");
    }
}

#[tokio::test]
async fn field_order_does_not_change_the_report() {
    let fields = vec![
        field("name", "", "required"),
        field("email", "x@", "email"),
        field("age", 7i64, "min:18"),
        Field::new("password", "secret").wire("password"),
        field("confirm", "secret!", "same:password"),
    ];
    let mut reversed = fields.clone();
    reversed.reverse();

    assert_eq!(check(fields).await, check(reversed).await);
}

#[tokio::test]
async fn single_permit_pool_completes() {
    let validator = Validator::new(ValidatorConfig::default().with_max_concurrency(1)).unwrap();
    let inner = RecordView::from_fields(vec![
        Field::new("country", "GH").wire("country"),
        field("zip", "", "required"),
    ]);
    let outer = RecordView::from_fields(vec![
        field("name", "Ama", "alpha"),
        field("address", Value::record(&inner), "_"),
        field("home", Value::record(&inner), "required"),
    ]);

    let report = tokio::time::timeout(Duration::from_secs(5), validator.validate(&outer))
        .await
        .expect("validation did not finish")
        .unwrap();
    assert_eq!(report.len(), 2);
}

struct ExplodingSniffer;

impl ContentSniffer for ExplodingSniffer {
    fn detect_extension(&self, _content: &[u8]) -> String {
        panic!("sniffer exploded");
    }
}

#[tokio::test]
async fn panicking_field_leaves_siblings_intact() {
    let validator = Validator::builder()
        .sniffer(Arc::new(ExplodingSniffer))
        .build()
        .unwrap();
    let record = RecordView::from_fields(vec![
        field("photo", FileUpload::in_memory("me.png", vec![1u8, 2, 3]), "image"),
        field("name", "", "required"),
        field("city", "Accra", "alpha"),
    ]);

    let report = validator.validate(&record).await.unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report.get("photo").unwrap().key, "panic");
    assert_eq!(
        report.message("photo"),
        Some("validation panic: sniffer exploded")
    );
    assert_eq!(report.message("name"), Some("The name field is required."));
}
