//! Tests for the validator: ordering, short-circuiting, absent values,
//! composite rules and translation.

use formkit::Value;
use formkit::i18n::Catalog;
use formkit::validation::{ValidationFailure, ValidationRule, Validator, rules};

fn named(name: &str) -> [Option<Value>; 1] {
    [Some(Value::from(name))]
}

fn always_fails(name: &str) -> ValidationRule {
    ValidationRule::new(name, format!("{name} failed"), |_, _| false)
}

#[test]
fn test_abort_early_stops_at_first_failure() {
    let validator = Validator::new([always_fails("a"), always_fails("b"), always_fails("c")]);
    let errors = validator.validate(Some(&"x".into()), true, &[]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "a");
    assert_eq!(errors[0].message, "a failed");
}

#[test]
fn test_collects_all_failures_in_rule_order() {
    let validator = Validator::new([always_fails("a"), rules::min_length(1), always_fails("c")]);
    let errors = validator.validate(Some(&"x".into()), false, &[]);
    let names: Vec<_> = errors.iter().map(|e| e.rule.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn test_absent_value_skips_rules_not_accepting_empty() {
    let validator = Validator::new([always_fails("strict")]);
    assert!(validator.validate(None, false, &[]).is_empty());
}

#[test]
fn test_required_reports_missing_value_with_field_name() {
    let validator = Validator::new([rules::required(), rules::email()]);
    let errors = validator.validate(None, false, &named("Email"));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Email is required");
}

#[test]
fn test_required_without_name_uses_fallback_literal() {
    let validator = Validator::new([rules::required()]);
    let errors = validator.validate(Some(&"   ".into()), true, &[]);
    assert_eq!(errors[0].message, "This field is required");
}

#[test]
fn test_composite_reports_first_failing_sub_rule() {
    let username = rules::all_of("username", [rules::min_length(3), rules::max_length(5)]);
    let validator = Validator::new([username]);

    let errors = validator.validate(Some(&"toolongname".into()), false, &named("User"));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "max_length");
    assert_eq!(errors[0].message, "User is too long (maximum 5)");

    assert!(validator.validate(Some(&"kari".into()), false, &[]).is_empty());
}

#[test]
fn test_composite_sub_rules_keep_empty_handling() {
    let composite = rules::all_of("both", [rules::required(), rules::min_length(2)]);
    let validator = Validator::new([composite]);
    let errors = validator.validate(None, false, &[]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "required");
}

#[test]
fn test_add_rule_replaces_by_name_in_place() {
    let mut validator = Validator::new([always_fails("first"), always_fails("second")]);
    validator.add_rule(ValidationRule::new("first", "replaced", |_, _| false));

    assert_eq!(validator.len(), 2);
    assert_eq!(validator.rules()[0].message(), "replaced");

    let errors = validator.validate(Some(&"x".into()), true, &[]);
    assert_eq!(errors[0].message, "replaced");
}

#[test]
fn test_remove_rules() {
    let mut validator = Validator::new([always_fails("a"), always_fails("b"), always_fails("c")]);
    validator.remove_rules(["a", "c"]);
    assert!(validator.has_rule("b"));
    assert!(!validator.has_rule("a"));
    assert_eq!(validator.len(), 1);

    validator.remove_all_rules();
    assert!(validator.is_empty());
}

#[test]
fn test_try_validate_single_failure() {
    let validator = Validator::new([rules::required()]);
    match validator.try_validate(None, false, &named("Name")) {
        Err(ValidationFailure::Single(error)) => {
            assert_eq!(error.message, "Name is required");
            assert_eq!(error.to_string(), "Name is required");
        }
        other => panic!("expected single failure, got {other:?}"),
    }
}

#[test]
fn test_try_validate_aggregates_multiple_failures() {
    let validator = Validator::new([always_fails("a"), always_fails("b")]);
    let failure = validator
        .try_validate(Some(&1i64.into()), false, &[])
        .expect_err("both rules fail");
    assert!(matches!(failure, ValidationFailure::Aggregate(_)));
    assert_eq!(failure.errors().len(), 2);
    assert_eq!(failure.to_string(), "a failed\nb failed");
}

#[test]
fn test_try_validate_ok() {
    let validator = Validator::new([rules::required()]);
    assert!(validator.try_validate(Some(&"x".into()), true, &[]).is_ok());
}

#[test]
fn test_translator_replaces_template_before_formatting() {
    let catalog = Catalog::new().entry("{1:'This field'} is required", "{1:'Dieses Feld'} ist erforderlich");
    let validator = Validator::new([rules::required(), rules::email()]).with_translator(catalog);

    let errors = validator.validate(None, true, &[]);
    assert_eq!(errors[0].message, "Dieses Feld ist erforderlich");

    let errors = validator.validate(None, true, &named("E-Mail"));
    assert_eq!(errors[0].message, "E-Mail ist erforderlich");

    // Keys without a translation fall back to the original template.
    let errors = validator.validate(Some(&"nope".into()), true, &named("E-Mail"));
    assert_eq!(errors[0].message, "E-Mail must be a valid email address");
}

#[test]
fn test_closure_translator() {
    let validator = Validator::new([always_fails("x")])
        .with_translator(|key: &str| (key == "x failed").then(|| "{0} is wrong".to_string()));
    let errors = validator.validate(Some(&42i64.into()), true, &[]);
    assert_eq!(errors[0].message, "42 is wrong");
}
