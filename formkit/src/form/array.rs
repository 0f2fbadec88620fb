use std::sync::{Arc, RwLock, Weak};

use log::{debug, warn};

use super::base::{Field, FieldCore, FieldId};
use crate::event::{EventEmitter, ListenerId};
use crate::value::Value;

/// Payload of an array's `item_change` event.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChange {
    /// Position of the item at the time of the change.
    pub index: usize,
    pub value: Option<Value>,
}

struct ArrayInner {
    core: FieldCore,
    /// Prototype for new items. Never part of the live list.
    template: Arc<dyn Field>,
    items: RwLock<Vec<Arc<dyn Field>>>,
    default: RwLock<Option<Vec<Value>>>,
    item_change: EventEmitter<ItemChange>,
    this: Weak<ArrayInner>,
}

/// A composite field holding an ordered, variable-length list of items,
/// each an independent copy of a template field.
///
/// The value is always a list, empty when there are no items.
///
/// # Example
///
/// ```
/// use formkit::prelude::*;
///
/// let tags = field_array(field().validator([rules::required()])).with_name("Tags");
/// tags.set(vec!["a", "", "c"]);
/// assert_eq!(tags.size(), 3);
///
/// assert!(!tags.validate(false, false));
/// assert_eq!(tags.errors(), vec!["Tags is required"]);
///
/// assert!(tags.remove(&"".into()));
/// assert!(tags.validate(false, false));
/// ```
#[derive(Clone)]
pub struct FormFieldArray {
    inner: Arc<ArrayInner>,
}

impl FormFieldArray {
    /// Create an empty array whose items are copies of `template`.
    pub fn new(template: impl Field + 'static) -> Self {
        Self::assemble(FieldCore::new(), template.clone_field(), None)
    }

    fn assemble(core: FieldCore, template: Arc<dyn Field>, default: Option<Vec<Value>>) -> Self {
        let array = Self {
            inner: Arc::new_cyclic(|this| ArrayInner {
                core,
                template,
                items: RwLock::new(Vec::new()),
                default: RwLock::new(None),
                item_change: EventEmitter::new(),
                this: this.clone(),
            }),
        };
        if let Some(default) = default {
            array.install_default(default);
        }
        array
    }

    /// Items restored by [`Field::reset`]. A pristine array also takes them
    /// as its current items, without emitting `change`.
    pub fn with_default(self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.install_default(values.into_iter().map(Into::into).collect());
        self
    }

    fn install_default(&self, values: Vec<Value>) {
        if !self.is_dirty() {
            let items = self.build_items(values.clone(), false);
            *self.items_mut() = items;
        }
        *self
            .inner
            .default
            .write()
            .unwrap_or_else(|p| p.into_inner()) = Some(values);
    }

    pub fn default_value(&self) -> Option<Vec<Value>> {
        self.inner
            .default
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|p| p.into_inner().clone())
    }

    pub fn template(&self) -> &Arc<dyn Field> {
        &self.inner.template
    }

    /// Number of items.
    pub fn size(&self) -> usize {
        self.items_ref().len()
    }

    /// Snapshot of the live items.
    pub fn items(&self) -> Vec<Arc<dyn Field>> {
        self.items_ref().clone()
    }

    pub fn item(&self, index: usize) -> Option<Arc<dyn Field>> {
        self.items_ref().get(index).cloned()
    }

    /// Append a new item, set to `value` when given. The item starts dirty.
    pub fn add(&self, value: Option<Value>) -> Arc<dyn Field> {
        let item = self.make_item();
        if value.is_some() {
            item.set_value(value, true);
        }
        item.mark_as_dirty();
        self.subscribe(&item);
        self.items_mut().push(Arc::clone(&item));
        debug!("Added item to {:?}, size={}", self.name(), self.size());
        self.structure_changed();
        item
    }

    /// Remove the first item whose value equals `value`.
    pub fn remove(&self, value: &Value) -> bool {
        let position = self
            .items_ref()
            .iter()
            .position(|item| item.value().as_ref() == Some(value));
        position.and_then(|index| self.remove_at(index)).is_some()
    }

    /// Remove the item at `index`, returning it.
    pub fn remove_at(&self, index: usize) -> Option<Arc<dyn Field>> {
        let removed = {
            let mut items = self.items_mut();
            (index < items.len()).then(|| items.remove(index))
        }?;
        debug!("Removed item {} from {:?}", index, self.name());
        self.structure_changed();
        Some(removed)
    }

    /// Remove every item. The array's own errors are left as they are.
    pub fn clear(&self) {
        self.items_mut().clear();
        debug!("Cleared {:?}", self.name());
        self.inner.core.emit_change(&self.value());
    }

    /// Observe changes of individual items.
    pub fn on_item_change<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&ItemChange) + Send + Sync + 'static,
    {
        self.inner.item_change.subscribe(handler)
    }

    pub fn unsubscribe_item_change(&self, id: ListenerId) -> bool {
        self.inner.item_change.unsubscribe(id)
    }

    /// An independent, empty-or-default array with the same template,
    /// rules and settings.
    pub fn duplicate(&self) -> FormFieldArray {
        Self::assemble(
            self.inner.core.duplicate(),
            self.inner.template.clone_field(),
            self.default_value(),
        )
    }

    fn make_item(&self) -> Arc<dyn Field> {
        let item = self.inner.template.clone_field();
        item.core().attach(&self.inner.core, None);
        item
    }

    fn subscribe(&self, item: &Arc<dyn Field>) {
        let this = self.inner.this.clone();
        let id = item.core().id();
        item.core().on_change(move |value| {
            if let Some(inner) = this.upgrade() {
                FormFieldArray { inner }.item_changed(id, value);
            }
        });
    }

    fn build_items(&self, values: Vec<Value>, mark_as_dirty: bool) -> Vec<Arc<dyn Field>> {
        values
            .into_iter()
            .map(|value| {
                let item = self.make_item();
                item.set_value(Some(value), mark_as_dirty);
                if mark_as_dirty {
                    item.mark_as_dirty();
                }
                self.subscribe(&item);
                item
            })
            .collect()
    }

    fn item_changed(&self, id: FieldId, value: &Option<Value>) {
        let Some(index) = self.items_ref().iter().position(|item| item.core().id() == id) else {
            return;
        };
        self.inner.item_change.emit(&ItemChange {
            index,
            value: value.clone(),
        });
        if self.inner.core.validate_on_change() {
            self.refresh_errors();
        }
        self.inner.core.emit_change(&self.value());
    }

    fn structure_changed(&self) {
        if self.inner.core.validate_on_change() {
            self.refresh_errors();
        }
        self.inner.core.emit_change(&self.value());
    }

    /// Own rules plus the items' current errors, without re-running the
    /// items' validators.
    fn refresh_errors(&self) {
        let mut errors = self.inner.core.run_validator(self.value().as_ref());
        for item in self.items() {
            errors.extend(item.errors());
        }
        self.inner.core.set_errors(errors);
    }

    fn items_ref(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<dyn Field>>> {
        self.inner.items.read().unwrap_or_else(|p| p.into_inner())
    }

    fn items_mut(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<dyn Field>>> {
        self.inner.items.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl Field for FormFieldArray {
    fn core(&self) -> &FieldCore {
        &self.inner.core
    }

    /// List of the present item values.
    fn value(&self) -> Option<Value> {
        let values = self.items().iter().filter_map(|item| item.value()).collect();
        Some(Value::List(values))
    }

    /// Replace all items with one item per list element. Absent clears the
    /// array; non-list values are logged and ignored.
    fn set_value(&self, value: Option<Value>, mark_as_dirty: bool) {
        let values = match value {
            None => Vec::new(),
            Some(Value::List(values)) => values,
            Some(other) => {
                warn!(
                    "Array {:?} can only hold a list, got {}",
                    self.name(),
                    other.type_name()
                );
                return;
            }
        };
        let items = self.build_items(values, mark_as_dirty);
        *self.items_mut() = items;
        if mark_as_dirty {
            self.inner.core.set_dirty(true);
        }
        debug!("Replaced items of {:?}, size={}", self.name(), self.size());
        self.structure_changed();
    }

    /// Restore the default items, or none.
    fn reset(&self) {
        debug!("Resetting array {:?}", self.name());
        self.set_value(self.default_value().map(Value::List), false);
        self.inner.core.reset_state();
    }

    fn clone_field(&self) -> Arc<dyn Field> {
        Arc::new(self.duplicate())
    }

    fn is_dirty(&self) -> bool {
        self.inner.core.dirty_flag() || self.items().iter().any(|item| item.is_dirty())
    }

    fn mark_as_dirty(&self) {
        self.inner.core.set_dirty(true);
        for item in self.items() {
            item.mark_as_dirty();
        }
    }

    fn mark_as_pristine(&self) {
        self.inner.core.set_dirty(false);
        for item in self.items() {
            item.mark_as_pristine();
        }
    }

    fn clear_all_errors(&self) {
        self.inner.core.clear_errors();
        for item in self.items() {
            item.clear_all_errors();
        }
    }

    /// Own rules first, then every item in order.
    fn validate(&self, mark_as_dirty_first: bool, focus: bool) -> bool {
        if mark_as_dirty_first {
            self.mark_as_dirty();
        }
        let mut errors = self.inner.core.run_validator(self.value().as_ref());
        let mut valid = errors.is_empty();
        for item in self.items() {
            valid &= item.validate_as_child(mark_as_dirty_first);
            errors.extend(item.errors());
        }
        self.inner.core.set_errors(errors);
        debug!("Validated array {:?}: valid={}", self.name(), valid);
        if focus && !valid {
            self.focus_invalid();
        }
        valid
    }

    fn focus_invalid(&self) -> bool {
        if self.items().iter().any(|item| item.focus_invalid()) {
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

impl std::fmt::Debug for FormFieldArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormFieldArray")
            .field("core", &self.inner.core)
            .field("size", &self.size())
            .finish()
    }
}
