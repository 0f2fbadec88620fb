//! Tests for field groups: value collapse, propagation of changes and
//! dirtiness, validation aggregation and focus delegation.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use formkit::prelude::*;

fn object(entries: &[(&str, Value)]) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn person() -> FormFieldGroup {
    field_group()
        .field("first", field().validator([rules::required()]))
        .field("last", field().validator([rules::required()]))
        .build()
        .with_name("person")
}

#[test]
fn test_empty_group_value_is_absent() {
    let group = person();
    assert_eq!(group.value(), None);
}

#[test]
fn test_value_contains_only_present_children() {
    let group = person();
    group.set_value(Some(object(&[("first", "Kari".into())])), true);
    assert_eq!(group.value(), Some(object(&[("first", "Kari".into())])));
}

#[test]
fn test_dotted_keys_address_nested_objects() {
    let group = field_group()
        .field("address.city", field())
        .field("address.zip", field())
        .build();

    let value = object(&[(
        "address",
        object(&[("city", "Oslo".into()), ("zip", "0150".into())]),
    )]);
    group.set_value(Some(value.clone()), true);

    assert_eq!(group.get("address.city").and_then(|f| f.value()), Some("Oslo".into()));
    assert_eq!(group.value(), Some(value));
}

#[test]
fn test_children_get_qualified_names() {
    let group = person();
    let first = group.get("first").expect("child exists");
    assert_eq!(first.name(), Some("person.first".to_string()));
}

#[test]
fn test_children_are_copies_of_definitions() {
    let definition = field();
    let group = field_group().field("name", definition.clone()).build();
    group.set_value(Some(object(&[("name", "x".into())])), true);
    assert_eq!(definition.value(), None);
}

#[test]
fn test_child_change_reemits_on_group() {
    let group = person();
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);
    group.on_change(move |value| sink.lock().unwrap().push(value.clone()));

    let field_changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&field_changes);
    group.on_field_change(move |change| sink.lock().unwrap().push(change.key.clone()));

    group.get("last").expect("child exists").set_value(Some("Nordmann".into()), true);

    assert_eq!(
        *changes.lock().unwrap(),
        vec![Some(object(&[("last", "Nordmann".into())]))]
    );
    assert_eq!(*field_changes.lock().unwrap(), vec!["last".to_string()]);
}

#[test]
fn test_group_is_dirty_when_a_child_is() {
    let group = person();
    assert!(group.is_pristine());

    group.get("first").expect("child exists").set_value(Some("Kari".into()), true);
    assert!(group.is_dirty());

    group.mark_as_pristine();
    assert!(group.is_pristine());

    group.mark_as_dirty();
    assert!(group.get("last").expect("child exists").is_dirty());
}

#[test]
fn test_resetting_the_dirty_child_makes_group_pristine() {
    let group = person();
    let first = group.get("first").expect("child exists");

    first.set_value(Some("Kari".into()), true);
    assert!(group.is_dirty());

    first.reset();
    assert!(first.is_pristine());
    assert!(group.is_pristine());
}

#[test]
fn test_mark_as_dirty_applies_to_childless_group() {
    let group = field_group().build().rule(rules::required()).with_name("extras");
    assert!(group.is_pristine());

    assert!(!group.validate(true, false));
    assert!(group.is_dirty());
    assert_eq!(group.dirty_errors(), vec!["extras is required"]);

    group.mark_as_pristine();
    assert!(group.is_pristine());
}

#[test]
fn test_validate_aggregates_own_and_child_errors() {
    let group = field_group()
        .field("password", field().validator([rules::required()]))
        .field("confirm", field().validator([rules::required()]))
        .build()
        .with_name("account")
        .rule(ValidationRule::new("match", "Passwords must match", |value, _| {
            let map = value.as_object();
            map.and_then(|m| m.get("password")) == map.and_then(|m| m.get("confirm"))
        }));

    group.set_value(Some(object(&[("password", "hunter2".into())])), true);
    assert!(!group.validate(false, false));
    assert_eq!(
        group.errors(),
        vec!["Passwords must match", "account.confirm is required"]
    );

    group.get("confirm").expect("child exists").set_value(Some("hunter2".into()), true);
    assert!(group.validate(false, false));
    assert!(group.errors().is_empty());
}

#[test]
fn test_validate_on_change_refreshes_group_errors() {
    let group = person();
    group.get("first").expect("child exists").set_value(Some("".into()), true);
    assert_eq!(group.errors(), vec!["person.first is required"]);

    group.get("first").expect("child exists").set_value(Some("Kari".into()), true);
    assert!(group.errors().is_empty());
}

#[test]
fn test_validate_on_change_is_inherited() {
    let group = person().validate_on_change(false);
    let first = group.get("first").expect("child exists");
    first.set_value(Some("".into()), true);
    assert!(first.is_valid());
}

#[test]
fn test_validate_marks_every_child_dirty() {
    let group = person();
    assert!(!group.validate(true, false));
    assert!(group.get("first").expect("child exists").is_dirty());
    assert!(group.get("last").expect("child exists").is_dirty());
}

#[test]
fn test_empty_nested_group_only_checks_own_rules() {
    let address = field_group()
        .field("street", field().validator([rules::required()]))
        .build();
    let form = field_group()
        .field("name", field())
        .field("address", address)
        .build();

    assert!(form.validate(false, false));

    form.set_value(
        Some(object(&[("address", object(&[("zip", "0150".into())]))])),
        true,
    );
    // No child of `address` took a value, so it is still empty.
    assert!(form.validate(false, false));

    form.patch_value(object(&[("address", object(&[("street", "".into())]))]), true);
    assert!(!form.validate(false, false));
    assert_eq!(form.errors(), vec!["address.street is required"]);
}

#[test]
fn test_emptied_nested_group_drops_stale_child_errors() {
    let scheduler = Scheduler::new();
    let focused = Arc::new(Mutex::new(Vec::new()));
    let form = field_group()
        .field(
            "address",
            field_group()
                .field("street", field().validator([rules::required()]))
                .build(),
        )
        .field("name", field().validator([rules::required()]))
        .build()
        .with_scheduler(scheduler.clone());

    let sink = Arc::clone(&focused);
    form.get("name")
        .expect("child exists")
        .bind_element(Arc::new(move || sink.lock().unwrap().push("name")));

    form.patch_value(object(&[("address", object(&[("street", "x".into())]))]), true);
    form.patch_value(object(&[("address", object(&[]))]), true);
    let address = form.get("address").expect("child exists");
    assert_eq!(address.value(), None);
    // Clearing the street validated it on change.
    assert_eq!(address.errors(), vec!["address.street is required"]);

    assert!(!form.validate(false, true));
    assert_eq!(form.errors(), vec!["name is required"]);
    assert!(address.is_valid());
    assert!(!address.is_dirty_and_invalid());

    scheduler.run_pending();
    assert_eq!(*focused.lock().unwrap(), vec!["name"]);
}

#[test]
fn test_patch_value_leaves_other_children() {
    let group = person();
    group.set_value(
        Some(object(&[("first", "Kari".into()), ("last", "Nordmann".into())])),
        true,
    );
    group.patch_value(object(&[("last", "Hansen".into())]), true);
    assert_eq!(
        group.value(),
        Some(object(&[("first", "Kari".into()), ("last", "Hansen".into())]))
    );
}

#[test]
fn test_non_object_value_is_ignored() {
    let group = person();
    group.set_value(Some(object(&[("first", "Kari".into())])), true);
    group.set_value(Some("oops".into()), true);
    group.patch_value(Value::from(3i64), true);
    assert_eq!(group.value(), Some(object(&[("first", "Kari".into())])));
}

#[test]
fn test_reset_fields_resets_selected_children() {
    let group = field_group()
        .field("first", field().with_default("Ola"))
        .field("last", field())
        .build();
    group.set_value(
        Some(object(&[("first", "Kari".into()), ("last", "Nordmann".into())])),
        true,
    );

    group.reset_fields(&["first"]);
    assert_eq!(group.get("first").and_then(|f| f.value()), Some("Ola".into()));
    assert_eq!(group.get("last").and_then(|f| f.value()), Some("Nordmann".into()));

    group.reset();
    assert_eq!(group.value(), Some(object(&[("first", "Ola".into())])));
    assert!(group.is_pristine());
}

#[test]
fn test_focus_goes_to_first_invalid_child() {
    let scheduler = Scheduler::new();
    let focused = Arc::new(Mutex::new(Vec::new()));
    let group = person().with_scheduler(scheduler.clone());

    for key in ["first", "last"] {
        let sink = Arc::clone(&focused);
        group
            .get(key)
            .expect("child exists")
            .bind_element(Arc::new(move || sink.lock().unwrap().push(key)));
    }

    group.get("first").expect("child exists").set_value(Some("Kari".into()), true);
    assert!(!group.validate(true, true));
    assert!(focused.lock().unwrap().is_empty());

    scheduler.run_pending();
    assert_eq!(*focused.lock().unwrap(), vec!["last"]);
}

#[test]
fn test_group_focuses_itself_when_only_own_rules_fail() {
    let scheduler = Scheduler::new();
    let focused = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&focused);

    let group = field_group()
        .field("a", field())
        .build()
        .rule(rules::required())
        .with_scheduler(scheduler.clone());
    group.bind_element(Arc::new(move || {
        handle.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(!group.validate(false, true));
    scheduler.run_pending();
    assert_eq!(focused.load(Ordering::SeqCst), 1);
}

#[test]
fn test_duplicate_group_is_independent() {
    let group = person();
    group.set_value(Some(object(&[("first", "Kari".into())])), true);

    let copy = group.duplicate();
    assert_eq!(copy.value(), None);
    copy.set_value(Some(object(&[("last", "Hansen".into())])), true);
    assert_eq!(group.value(), Some(object(&[("first", "Kari".into())])));
    assert_eq!(
        copy.get("last").and_then(|f| f.name()),
        Some("person.last".to_string())
    );
}
