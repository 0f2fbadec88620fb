//! Tests for field arrays: item management, value shape, change
//! propagation and validation aggregation.

use std::sync::{Arc, Mutex};

use formkit::prelude::*;

fn strings(values: &[&str]) -> Value {
    Value::List(values.iter().map(|v| Value::from(*v)).collect())
}

fn tags() -> FormFieldArray {
    field_array(field().validator([rules::required()])).with_name("tags")
}

#[test]
fn test_set_value_creates_one_item_per_element() {
    let array = tags();
    array.set_value(Some(strings(&["a", "b", "c"])), true);
    assert_eq!(array.size(), 3);
    assert_eq!(array.value(), Some(strings(&["a", "b", "c"])));
    assert_eq!(array.item(1).and_then(|item| item.value()), Some("b".into()));
}

#[test]
fn test_empty_array_value_is_empty_list() {
    let array = tags();
    assert_eq!(array.value(), Some(Value::List(Vec::new())));

    array.set_value(None, true);
    assert_eq!(array.size(), 0);
}

#[test]
fn test_template_is_not_an_item() {
    let template = field().with_default("t");
    let array = field_array(template.clone());
    assert_eq!(array.size(), 0);

    let item = array.add(None);
    assert_eq!(item.value(), Some("t".into()));
    item.set_value(Some("changed".into()), true);
    assert_eq!(template.value(), Some("t".into()));
    assert_eq!(array.template().value(), Some("t".into()));
}

#[test]
fn test_remove_by_value() {
    let array = tags();
    array.set_value(Some(strings(&["a", "b", "c"])), true);

    assert!(array.remove(&"b".into()));
    assert_eq!(array.value(), Some(strings(&["a", "c"])));
    assert!(!array.remove(&"zzz".into()));
}

#[test]
fn test_remove_at() {
    let array = tags();
    array.set_value(Some(strings(&["a", "b"])), true);
    let removed = array.remove_at(0).expect("item exists");
    assert_eq!(removed.value(), Some("a".into()));
    assert!(array.remove_at(5).is_none());
    assert_eq!(array.size(), 1);
}

#[test]
fn test_add_marks_item_dirty() {
    let array = tags();
    let item = array.add(None);
    assert!(item.is_dirty());
    assert!(array.is_dirty());

    let item = array.add(Some("x".into()));
    assert!(item.is_dirty());
    assert_eq!(array.size(), 2);
}

#[test]
fn test_clear_keeps_own_errors() {
    let array = tags().rule(rules::min_length(2).with_message("Too few tags"));
    array.set_value(Some(strings(&["a"])), true);
    assert_eq!(array.errors(), vec!["Too few tags"]);

    array.clear();
    assert_eq!(array.size(), 0);
    assert_eq!(array.errors(), vec!["Too few tags"]);
}

#[test]
fn test_validate_aggregates_item_errors() {
    let array = tags();
    array.set_value(Some(strings(&["a", "", "c"])), true);

    assert!(!array.validate(false, false));
    assert_eq!(array.errors(), vec!["tags is required"]);
    assert!(array.item(1).is_some_and(|item| item.is_invalid()));
}

#[test]
fn test_validate_runs_own_rules_first() {
    let array = tags().rule(rules::max_length(1).with_message("One tag at most"));
    array.set_value(Some(strings(&["", "b"])), true);

    assert!(!array.validate(false, false));
    assert_eq!(array.errors(), vec!["One tag at most", "tags is required"]);
}

#[test]
fn test_validate_marks_empty_array_dirty() {
    let array = field_array(field())
        .rule(rules::min_length(1))
        .with_name("tags");
    assert!(array.is_pristine());

    assert!(!array.validate(true, false));
    assert!(array.is_dirty());
    assert!(array.is_dirty_and_invalid());
    assert_eq!(array.dirty_errors(), vec!["tags is too short (minimum 1)"]);

    array.reset();
    assert!(array.is_pristine());
    assert!(array.dirty_errors().is_empty());
}

#[test]
fn test_item_change_reports_live_index() {
    let array = tags();
    array.set_value(Some(strings(&["a", "b", "c"])), true);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    array.on_item_change(move |change| sink.lock().unwrap().push(change.clone()));

    let last = array.item(2).expect("item exists");
    array.remove_at(0);
    last.set_value(Some("z".into()), true);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![ItemChange {
            index: 1,
            value: Some("z".into())
        }]
    );
}

#[test]
fn test_removed_items_no_longer_propagate() {
    let array = tags();
    array.set_value(Some(strings(&["a"])), true);
    let removed = array.remove_at(0).expect("item exists");

    let changes = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&changes);
    array.on_change(move |_| *sink.lock().unwrap() += 1);

    removed.set_value(Some("ghost".into()), true);
    assert_eq!(*changes.lock().unwrap(), 0);
}

#[test]
fn test_item_change_reemits_array_value() {
    let array = tags();
    array.set_value(Some(strings(&["a"])), true);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    array.on_change(move |value| sink.lock().unwrap().push(value.clone()));

    array.item(0).expect("item exists").set_value(Some("b".into()), true);
    assert_eq!(*seen.lock().unwrap(), vec![Some(strings(&["b"]))]);
}

#[test]
fn test_non_list_value_is_ignored() {
    let array = tags();
    array.set_value(Some(strings(&["a"])), true);
    array.set_value(Some("oops".into()), true);
    assert_eq!(array.size(), 1);
}

#[test]
fn test_reset_restores_default_items() {
    let array = tags().with_default(["x", "y"]);
    assert_eq!(array.size(), 2);
    assert!(array.is_pristine());

    array.add(Some("z".into()));
    array.reset();
    assert_eq!(array.value(), Some(strings(&["x", "y"])));
    assert!(array.is_pristine());

    let empty = tags();
    empty.add(None);
    empty.reset();
    assert_eq!(empty.size(), 0);
}

#[test]
fn test_items_are_named_after_the_array() {
    let array = tags();
    let item = array.add(None);
    assert_eq!(item.name(), Some("tags".to_string()));
}

#[test]
fn test_array_of_groups() {
    let people = field_array(
        field_group()
            .field("name", field().validator([rules::required()]))
            .build(),
    )
    .with_name("people");

    let mut alice = std::collections::BTreeMap::new();
    alice.insert("name".to_string(), Value::from("Alice"));
    people.set_value(Some(Value::List(vec![Value::Object(alice)])), true);

    let blank = people.add(None);
    assert!(blank.value().is_none());
    assert!(people.validate(false, false));

    blank.set_value(
        Some(Value::Object(
            [("name".to_string(), Value::from(""))].into_iter().collect(),
        )),
        true,
    );
    assert!(!people.validate(false, false));
    assert_eq!(people.errors(), vec!["people.name is required"]);
}

#[test]
fn test_focus_invalid_prefers_items() {
    let scheduler = Scheduler::new();
    let focused = Arc::new(Mutex::new(Vec::new()));
    let array = tags().with_scheduler(scheduler.clone());
    array.set_value(Some(strings(&["a", ""])), true);

    let sink = Arc::clone(&focused);
    array.bind_element(Arc::new(move || sink.lock().unwrap().push("array")));
    let sink = Arc::clone(&focused);
    array
        .item(1)
        .expect("item exists")
        .bind_element(Arc::new(move || sink.lock().unwrap().push("item")));

    assert!(!array.validate(true, true));
    scheduler.run_pending();
    assert_eq!(*focused.lock().unwrap(), vec!["item"]);
}

#[test]
fn test_duplicate_array_is_independent() {
    let array = tags().with_default(["x"]);
    array.add(Some("y".into()));

    let copy = array.duplicate();
    assert_eq!(copy.value(), Some(strings(&["x"])));
    copy.clear();
    assert_eq!(array.size(), 2);
}
