use std::sync::{Arc, RwLock};

use log::debug;

use super::base::{Field, FieldCore};
use crate::state::State;
use crate::value::Value;

/// Value pipeline stage applied by [`FormField::set_value`].
pub type Transform = Arc<dyn Fn(Option<Value>) -> Option<Value> + Send + Sync>;

struct FieldInner {
    core: FieldCore,
    value: State<Option<Value>>,
    default: RwLock<Option<Value>>,
    transforms: RwLock<Vec<Transform>>,
}

/// A leaf field holding a single value.
///
/// Cloning yields a handle to the same field; use [`FormField::duplicate`]
/// for an independent copy.
///
/// # Example
///
/// ```
/// use formkit::prelude::*;
///
/// let age = field().with_name("Age").validator([rules::required(), rules::min(18.0)]);
/// age.set(16i64);
/// assert!(age.is_dirty());
/// assert_eq!(age.errors(), vec!["Age must be at least 18"]);
///
/// age.reset();
/// assert!(age.value().is_none());
/// assert!(age.is_pristine());
/// ```
#[derive(Clone)]
pub struct FormField {
    inner: Arc<FieldInner>,
}

impl FormField {
    /// Create an empty field.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FieldInner {
                core: FieldCore::new(),
                value: State::new(None),
                default: RwLock::new(None),
                transforms: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Set the value restored by [`Field::reset`]. A pristine field also
    /// takes it as its current value, without emitting `change`.
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !self.inner.core.dirty_flag() {
            self.inner.value.set(Some(value.clone()));
        }
        *self.inner.default.write().unwrap_or_else(|p| p.into_inner()) = Some(value);
        self
    }

    /// Append a transform. Transforms run in order on every `set_value`,
    /// before the equality check.
    pub fn transform<F>(self, transform: F) -> Self
    where
        F: Fn(Option<Value>) -> Option<Value> + Send + Sync + 'static,
    {
        self.inner
            .transforms
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .push(Arc::new(transform));
        self
    }

    pub fn default_value(&self) -> Option<Value> {
        self.inner
            .default
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|p| p.into_inner().clone())
    }

    /// The reactive cell holding the value, for UI bindings.
    pub fn value_state(&self) -> State<Option<Value>> {
        self.inner.value.clone()
    }

    /// An independent field with the same default, rules, transforms and
    /// settings. The current value, errors and subscribers are not copied.
    pub fn duplicate(&self) -> FormField {
        let default = self.default_value();
        let transforms = self
            .inner
            .transforms
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|p| p.into_inner().clone());
        Self {
            inner: Arc::new(FieldInner {
                core: self.inner.core.duplicate(),
                value: State::new(default.clone()),
                default: RwLock::new(default),
                transforms: RwLock::new(transforms),
            }),
        }
    }

    fn apply_transforms(&self, value: Option<Value>) -> Option<Value> {
        let transforms = self
            .inner
            .transforms
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|p| p.into_inner().clone());
        transforms.iter().fold(value, |value, transform| transform(value))
    }
}

impl Default for FormField {
    fn default() -> Self {
        Self::new()
    }
}

impl Field for FormField {
    fn core(&self) -> &FieldCore {
        &self.inner.core
    }

    fn value(&self) -> Option<Value> {
        self.inner.value.get()
    }

    fn set_value(&self, value: Option<Value>, mark_as_dirty: bool) {
        let value = self.apply_transforms(value);
        if self.inner.value.with(|current| *current == value) {
            return;
        }
        self.inner.value.set(value.clone());
        self.inner.core.set_dirty(mark_as_dirty);
        if self.inner.core.validate_on_change() {
            self.validate(false, false);
        }
        self.inner.core.emit_change(&value);
    }

    fn reset(&self) {
        debug!("Resetting field {:?}", self.name());
        self.set_value(self.default_value(), false);
        self.inner.core.reset_state();
    }

    fn clone_field(&self) -> Arc<dyn Field> {
        Arc::new(self.duplicate())
    }
}

impl std::fmt::Debug for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormField")
            .field("core", &self.inner.core)
            .field("value", &self.value())
            .finish()
    }
}
