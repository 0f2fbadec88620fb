use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use log::{debug, warn};

use super::base::{Field, FieldCore};
use crate::event::{EventEmitter, ListenerId};
use crate::value::Value;

/// Payload of a group's `field_change` event.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Key of the child that changed, as declared in the group.
    pub key: String,
    pub value: Option<Value>,
}

struct GroupInner {
    core: FieldCore,
    fields: Vec<(String, Arc<dyn Field>)>,
    field_change: EventEmitter<FieldChange>,
}

/// A composite field holding named children.
///
/// The group's value is an object keyed by child name. Keys containing `.`
/// address nested objects, so a child under `"address.city"` reads and
/// writes `{"address": {"city": ..}}`.
///
/// # Example
///
/// ```
/// use formkit::prelude::*;
///
/// let login = field_group()
///     .field("user", field().validator([rules::required()]))
///     .field("password", field().validator([rules::required()]))
///     .build()
///     .with_name("login");
///
/// assert!(login.value().is_none());
/// assert!(!login.validate(true, false));
/// assert_eq!(login.errors(), vec!["login.user is required", "login.password is required"]);
/// ```
#[derive(Clone)]
pub struct FormFieldGroup {
    inner: Arc<GroupInner>,
}

/// Collects a group's children. Created by [`field_group`](super::field_group).
#[derive(Default)]
pub struct GroupBuilder {
    fields: Vec<(String, Arc<dyn Field>)>,
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child. The group stores its own copy of `field`.
    pub fn field(self, key: impl Into<String>, field: impl Field + 'static) -> Self {
        self.field_dyn(key, Arc::new(field))
    }

    pub fn field_dyn(mut self, key: impl Into<String>, field: Arc<dyn Field>) -> Self {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = field,
            None => self.fields.push((key, field)),
        }
        self
    }

    pub fn build(self) -> FormFieldGroup {
        FormFieldGroup::assemble(FieldCore::new(), self.fields)
    }
}

impl FormFieldGroup {
    fn assemble(core: FieldCore, definitions: Vec<(String, Arc<dyn Field>)>) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<GroupInner>| {
            let fields = definitions
                .into_iter()
                .map(|(key, definition)| {
                    let child = definition.clone_field();
                    child.core().attach(&core, Some(key.clone()));
                    let weak = weak.clone();
                    let changed_key = key.clone();
                    child.core().on_change(move |value| {
                        if let Some(inner) = weak.upgrade() {
                            FormFieldGroup { inner }.child_changed(&changed_key, value);
                        }
                    });
                    (key, child)
                })
                .collect();
            GroupInner {
                core,
                fields,
                field_change: EventEmitter::new(),
            }
        });
        Self { inner }
    }

    /// The child registered under `key`.
    pub fn get(&self, key: &str) -> Option<Arc<dyn Field>> {
        self.inner
            .fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, field)| Arc::clone(field))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn fields(&self) -> &[(String, Arc<dyn Field>)] {
        &self.inner.fields
    }

    pub fn len(&self) -> usize {
        self.inner.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.fields.is_empty()
    }

    /// Set only the children whose key is present in `partial`.
    ///
    /// Non-object values are logged and ignored.
    pub fn patch_value(&self, partial: Value, mark_as_dirty: bool) {
        let map = match partial {
            Value::Object(map) => map,
            other => {
                warn!(
                    "Group {:?} can only be patched with an object, got {}",
                    self.name(),
                    other.type_name()
                );
                return;
            }
        };
        for (key, child) in &self.inner.fields {
            if let Some(value) = value_at_path(&map, key) {
                child.set_value(Some(value.clone()), mark_as_dirty);
            }
        }
    }

    /// Reset the children named in `keys` (all children when empty), then
    /// the group itself.
    pub fn reset_fields(&self, keys: &[&str]) {
        debug!("Resetting group {:?} fields {:?}", self.name(), keys);
        for (key, child) in &self.inner.fields {
            if keys.is_empty() || keys.contains(&key.as_str()) {
                child.reset();
            }
        }
        self.inner.core.reset_state();
    }

    /// Observe changes of individual children.
    pub fn on_field_change<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&FieldChange) + Send + Sync + 'static,
    {
        self.inner.field_change.subscribe(handler)
    }

    pub fn unsubscribe_field_change(&self, id: ListenerId) -> bool {
        self.inner.field_change.unsubscribe(id)
    }

    /// An independent group with copies of every child.
    pub fn duplicate(&self) -> FormFieldGroup {
        Self::assemble(self.inner.core.duplicate(), self.inner.fields.clone())
    }

    /// Validate only the group's own rules. Children keep their values but
    /// drop any errors left from earlier validation.
    fn validate_self(&self, mark_as_dirty_first: bool) -> bool {
        if mark_as_dirty_first {
            self.mark_as_dirty();
        }
        for (_, child) in &self.inner.fields {
            child.clear_all_errors();
        }
        let errors = self.inner.core.run_validator(self.value().as_ref());
        let valid = errors.is_empty();
        self.inner.core.set_errors(errors);
        valid
    }

    /// Own rules plus the children's current errors, without re-running
    /// the children's validators.
    fn refresh_errors(&self) {
        let mut errors = self.inner.core.run_validator(self.value().as_ref());
        for (_, child) in &self.inner.fields {
            errors.extend(child.errors());
        }
        self.inner.core.set_errors(errors);
    }

    fn child_changed(&self, key: &str, value: &Option<Value>) {
        if self.inner.core.validate_on_change() {
            self.refresh_errors();
        }
        self.inner.field_change.emit(&FieldChange {
            key: key.to_string(),
            value: value.clone(),
        });
        self.inner.core.emit_change(&self.value());
    }
}

impl Field for FormFieldGroup {
    fn core(&self) -> &FieldCore {
        &self.inner.core
    }

    /// Object of the present child values, absent when every child is.
    fn value(&self) -> Option<Value> {
        let mut root = BTreeMap::new();
        for (key, child) in &self.inner.fields {
            if let Some(value) = child.value() {
                insert_path(&mut root, key, value);
            }
        }
        (!root.is_empty()).then_some(Value::Object(root))
    }

    /// Set every child from the matching entry of an object; children with
    /// no entry become absent. Non-object values are logged and ignored.
    fn set_value(&self, value: Option<Value>, mark_as_dirty: bool) {
        let map = match value {
            None => BTreeMap::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                warn!(
                    "Group {:?} can only hold an object, got {}",
                    self.name(),
                    other.type_name()
                );
                return;
            }
        };
        for (key, child) in &self.inner.fields {
            child.set_value(value_at_path(&map, key).cloned(), mark_as_dirty);
        }
    }

    fn reset(&self) {
        self.reset_fields(&[]);
    }

    fn clone_field(&self) -> Arc<dyn Field> {
        Arc::new(self.duplicate())
    }

    fn is_dirty(&self) -> bool {
        self.inner.core.dirty_flag()
            || self
                .inner
                .fields
                .iter()
                .any(|(_, child)| child.is_dirty())
    }

    fn mark_as_dirty(&self) {
        self.inner.core.set_dirty(true);
        for (_, child) in &self.inner.fields {
            child.mark_as_dirty();
        }
    }

    fn mark_as_pristine(&self) {
        self.inner.core.set_dirty(false);
        for (_, child) in &self.inner.fields {
            child.mark_as_pristine();
        }
    }

    fn clear_all_errors(&self) {
        self.inner.core.clear_errors();
        for (_, child) in &self.inner.fields {
            child.clear_all_errors();
        }
    }

    /// Own rules first, then every child in declaration order. The group's
    /// errors are its own messages followed by the children's.
    fn validate(&self, mark_as_dirty_first: bool, focus: bool) -> bool {
        if mark_as_dirty_first {
            self.mark_as_dirty();
        }
        let mut errors = self.inner.core.run_validator(self.value().as_ref());
        let mut valid = errors.is_empty();
        for (_, child) in &self.inner.fields {
            valid &= child.validate_as_child(mark_as_dirty_first);
            errors.extend(child.errors());
        }
        self.inner.core.set_errors(errors);
        debug!("Validated group {:?}: valid={}", self.name(), valid);
        if focus && !valid {
            self.focus_invalid();
        }
        valid
    }

    /// An entirely empty nested group only checks its own rules, so an
    /// optional sub-form does not report its children as missing.
    fn validate_as_child(&self, mark_as_dirty_first: bool) -> bool {
        if self.value().is_none() {
            self.validate_self(mark_as_dirty_first)
        } else {
            self.validate(mark_as_dirty_first, false)
        }
    }

    fn focus_invalid(&self) -> bool {
        if self
            .inner
            .fields
            .iter()
            .any(|(_, child)| child.focus_invalid())
        {
            return true;
        }
        if self.is_invalid() {
            self.focus();
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for FormFieldGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormFieldGroup")
            .field("core", &self.inner.core)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn insert_path(root: &mut BTreeMap<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            root.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = root
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(BTreeMap::new()));
            if !matches!(entry, Value::Object(_)) {
                *entry = Value::Object(BTreeMap::new());
            }
            if let Value::Object(nested) = entry {
                insert_path(nested, rest, value);
            }
        }
    }
}

fn value_at_path<'a>(root: &'a BTreeMap<String, Value>, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        None => root.get(path),
        Some((head, rest)) => match root.get(head)? {
            Value::Object(nested) => value_at_path(nested, rest),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_path_builds_nested_objects() {
        let mut root = BTreeMap::new();
        insert_path(&mut root, "address.city", "Oslo".into());
        insert_path(&mut root, "address.zip", "0150".into());
        insert_path(&mut root, "name", "Kari".into());

        let Some(Value::Object(address)) = root.get("address") else {
            panic!("expected nested object");
        };
        assert_eq!(address.get("city"), Some(&Value::from("Oslo")));
        assert_eq!(address.len(), 2);
        assert_eq!(root.len(), 2);
    }

    #[test]
    fn test_value_at_path_stops_at_non_objects() {
        let mut root = BTreeMap::new();
        insert_path(&mut root, "a.b", 1i64.into());
        assert_eq!(value_at_path(&root, "a.b"), Some(&Value::Int(1)));
        assert_eq!(value_at_path(&root, "a.b.c"), None);
        assert_eq!(value_at_path(&root, "missing"), None);
    }
}
