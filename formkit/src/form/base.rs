//! State shared by every field, and the [`Field`] trait.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

use log::trace;

use crate::config::FormConfig;
use crate::element::ElementRef;
use crate::event::{EventEmitter, ListenerId};
use crate::i18n::Translate;
use crate::schedule::Scheduler;
use crate::state::{Computed, State};
use crate::validation::{ValidationRule, Validator};
use crate::value::Value;

/// Unique identifier for a field instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

impl FieldId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "__field_{}", self.0)
    }
}

/// Per-field overrides. `None` inherits from the parent, then from
/// [`FormConfig::current`].
#[derive(Clone, Default)]
struct Settings {
    validate_on_change: Option<bool>,
    abort_early: Option<bool>,
    scheduler: Option<Scheduler>,
    translator: Option<Arc<dyn Translate>>,
}

struct CoreInner {
    id: FieldId,
    local_name: RwLock<Option<String>>,
    /// Non-owning link used for name qualification and setting inheritance.
    parent: RwLock<Option<Weak<CoreInner>>>,
    errors: State<Vec<String>>,
    dirty: State<bool>,
    validator: RwLock<Validator>,
    settings: RwLock<Settings>,
    element: RwLock<Option<ElementRef>>,
    change: EventEmitter<Option<Value>>,
    reset: EventEmitter<()>,
}

/// Reactive state every field carries: errors, dirty flag, validator,
/// name, bound element and the `change`/`reset` channels.
///
/// Cloning yields a handle to the same state.
#[derive(Clone)]
pub struct FieldCore {
    inner: Arc<CoreInner>,
}

impl FieldCore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CoreInner {
                id: FieldId::new(),
                local_name: RwLock::new(None),
                parent: RwLock::new(None),
                errors: State::default(),
                dirty: State::new(false),
                validator: RwLock::new(Validator::default()),
                settings: RwLock::new(Settings::default()),
                element: RwLock::new(None),
                change: EventEmitter::new(),
                reset: EventEmitter::new(),
            }),
        }
    }

    /// A fresh core with the same local name, rules and settings.
    ///
    /// Errors, dirty state, element, parent and subscribers are not copied.
    pub(crate) fn duplicate(&self) -> FieldCore {
        let copy = FieldCore::new();
        *write(&copy.inner.local_name) = self.local_name();
        *write(&copy.inner.validator) = self.validator();
        *write(&copy.inner.settings) = read(&self.inner.settings).clone();
        copy
    }

    pub fn id(&self) -> FieldId {
        self.inner.id
    }

    // -------------------------------------------------------------------------
    // Naming and hierarchy
    // -------------------------------------------------------------------------

    /// The qualified name: `parent.local` under a named parent, the parent's
    /// name for unnamed children (array items), otherwise the local name.
    pub fn name(&self) -> Option<String> {
        let local = self.local_name();
        match (self.parent().and_then(|p| p.name()), local) {
            (Some(parent), Some(local)) => Some(format!("{parent}.{local}")),
            (Some(parent), None) => Some(parent),
            (None, local) => local,
        }
    }

    pub fn local_name(&self) -> Option<String> {
        read(&self.inner.local_name).clone()
    }

    pub fn set_name(&self, name: Option<String>) {
        *write(&self.inner.local_name) = name;
    }

    pub fn parent(&self) -> Option<FieldCore> {
        read(&self.inner.parent)
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| FieldCore { inner })
    }

    /// Link this core under `parent`, replacing the local name with `key`.
    pub(crate) fn attach(&self, parent: &FieldCore, key: Option<String>) {
        *write(&self.inner.parent) = Some(Arc::downgrade(&parent.inner));
        self.set_name(key);
    }

    // -------------------------------------------------------------------------
    // Errors and dirty state
    // -------------------------------------------------------------------------

    pub fn errors(&self) -> Vec<String> {
        self.inner.errors.get()
    }

    /// The reactive cell behind [`FieldCore::errors`], for UI bindings.
    pub fn errors_state(&self) -> State<Vec<String>> {
        self.inner.errors.clone()
    }

    pub fn set_errors(&self, errors: Vec<String>) {
        self.inner.errors.set(errors);
    }

    pub fn add_errors(&self, messages: impl IntoIterator<Item = String>) {
        self.inner.errors.update(|errors| errors.extend(messages));
    }

    pub fn clear_errors(&self) {
        if !self.inner.errors.with(Vec::is_empty) {
            self.inner.errors.set(Vec::new());
        }
    }

    pub fn is_valid(&self) -> bool {
        self.inner.errors.with(Vec::is_empty)
    }

    /// Derived validity cell.
    pub fn valid_cell(&self) -> Computed<bool> {
        let errors = self.inner.errors.clone();
        Computed::new(move || errors.with(Vec::is_empty))
    }

    /// The stored dirty flag. Composite fields are also dirty when any child
    /// is; use [`Field::is_dirty`].
    pub fn dirty_flag(&self) -> bool {
        self.inner.dirty.get()
    }

    pub fn dirty_state(&self) -> State<bool> {
        self.inner.dirty.clone()
    }

    pub fn set_dirty(&self, dirty: bool) {
        if self.inner.dirty.get() != dirty {
            self.inner.dirty.set(dirty);
        }
    }

    // -------------------------------------------------------------------------
    // Validator
    // -------------------------------------------------------------------------

    pub fn validator(&self) -> Validator {
        read(&self.inner.validator).clone()
    }

    pub fn set_validator(&self, validator: Validator) {
        *write(&self.inner.validator) = validator;
    }

    pub fn add_rules(&self, rules: impl IntoIterator<Item = ValidationRule>) {
        write(&self.inner.validator).add_rules(rules);
    }

    pub fn remove_rules(&self, names: &[&str]) {
        write(&self.inner.validator).remove_rules(names);
    }

    pub fn has_rule(&self, name: &str) -> bool {
        read(&self.inner.validator).has_rule(name)
    }

    /// Run this field's own rules against `value`, with the field name as
    /// argument 1, and return the failure messages.
    pub fn run_validator(&self, value: Option<&Value>) -> Vec<String> {
        let args = [self.name().map(Value::String)];
        let abort_early = self.abort_early();
        let translator = self.translator();
        read(&self.inner.validator)
            .run(value, abort_early, &args, translator.as_deref())
            .into_iter()
            .map(|error| error.message)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    pub fn set_validate_on_change(&self, enabled: bool) {
        write(&self.inner.settings).validate_on_change = Some(enabled);
    }

    pub fn set_abort_early(&self, enabled: bool) {
        write(&self.inner.settings).abort_early = Some(enabled);
    }

    pub fn set_scheduler(&self, scheduler: Scheduler) {
        write(&self.inner.settings).scheduler = Some(scheduler);
    }

    pub fn set_translator(&self, translator: Arc<dyn Translate>) {
        write(&self.inner.settings).translator = Some(translator);
    }

    /// Adopt the settings in `config` as this field's own. A scheduler or
    /// translator the config leaves unset is still inherited.
    pub fn apply_config(&self, config: &FormConfig) {
        let mut settings = write(&self.inner.settings);
        settings.validate_on_change = Some(config.validate_on_change);
        settings.abort_early = Some(config.abort_early);
        if let Some(scheduler) = &config.scheduler {
            settings.scheduler = Some(scheduler.clone());
        }
        if let Some(translator) = &config.translator {
            settings.translator = Some(Arc::clone(translator));
        }
    }

    pub fn validate_on_change(&self) -> bool {
        self.resolve(&|s| s.validate_on_change)
            .unwrap_or_else(|| FormConfig::current().validate_on_change)
    }

    pub fn abort_early(&self) -> bool {
        self.resolve(&|s| s.abort_early)
            .unwrap_or_else(|| FormConfig::current().abort_early)
    }

    pub fn scheduler(&self) -> Scheduler {
        self.resolve(&|s| s.scheduler.clone())
            .unwrap_or_else(|| FormConfig::current().resolved_scheduler())
    }

    pub fn translator(&self) -> Option<Arc<dyn Translate>> {
        self.resolve(&|s| s.translator.clone())
            .or_else(|| FormConfig::current().translator)
    }

    fn resolve<T>(&self, pick: &dyn Fn(&Settings) -> Option<T>) -> Option<T> {
        let own = pick(&*read(&self.inner.settings));
        own.or_else(|| self.parent().and_then(|parent| parent.resolve(pick)))
    }

    // -------------------------------------------------------------------------
    // Element and focus
    // -------------------------------------------------------------------------

    pub fn bind_element(&self, element: ElementRef) {
        *write(&self.inner.element) = Some(element);
    }

    pub fn unbind_element(&self) {
        *write(&self.inner.element) = None;
    }

    pub fn element(&self) -> Option<ElementRef> {
        read(&self.inner.element).clone()
    }

    /// Focus the bound element on the next scheduler tick. Does nothing
    /// without a bound element.
    pub fn focus(&self) {
        let Some(element) = self.element() else {
            return;
        };
        trace!("Scheduling focus for {:?} ({})", self.name(), self.id());
        self.scheduler().defer(move || element.focus());
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn on_change<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&Option<Value>) + Send + Sync + 'static,
    {
        self.inner.change.subscribe(handler)
    }

    pub fn on_reset<F>(&self, handler: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.reset.subscribe(move |_| handler())
    }

    /// Remove a `change` or `reset` handler.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.change.unsubscribe(id) || self.inner.reset.unsubscribe(id)
    }

    pub(crate) fn emit_change(&self, value: &Option<Value>) {
        trace!("Change on {:?}", self.name());
        self.inner.change.emit(value);
    }

    /// The base part of every reset: clear errors, back to pristine, emit
    /// `reset`.
    pub(crate) fn reset_state(&self) {
        self.clear_errors();
        self.set_dirty(false);
        self.inner.reset.emit(&());
    }
}

impl Default for FieldCore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FieldCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCore")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("dirty", &self.dirty_flag())
            .field("errors", &self.errors())
            .finish()
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The contract shared by scalar, group and array fields.
///
/// Implementors provide value storage, `set_value`, `reset` and
/// `clone_field`; composites also override the dirty, validation and focus
/// methods to aggregate over their children.
pub trait Field: Send + Sync {
    /// Shared reactive state.
    fn core(&self) -> &FieldCore;

    /// Current value; `None` when absent.
    fn value(&self) -> Option<Value>;

    /// Commit a new value. Marks the field dirty unless `mark_as_dirty` is
    /// false, validates if validate-on-change is enabled, emits `change`.
    fn set_value(&self, value: Option<Value>, mark_as_dirty: bool);

    /// Restore the default or empty state, clear errors, emit `reset`.
    fn reset(&self);

    /// An independent copy with the same configuration and default value.
    fn clone_field(&self) -> Arc<dyn Field>;

    fn is_dirty(&self) -> bool {
        self.core().dirty_flag()
    }

    fn mark_as_dirty(&self) {
        self.core().set_dirty(true);
    }

    fn mark_as_pristine(&self) {
        self.core().set_dirty(false);
    }

    /// Run the validator against the current value and store the errors.
    ///
    /// Returns whether the field is valid afterwards.
    fn validate(&self, mark_as_dirty_first: bool, focus: bool) -> bool {
        if mark_as_dirty_first {
            self.mark_as_dirty();
        }
        let errors = self.core().run_validator(self.value().as_ref());
        self.core().set_errors(errors);
        let valid = self.is_valid();
        if focus && !valid {
            self.focus_invalid();
        }
        valid
    }

    /// Validation as run by a parent composite.
    fn validate_as_child(&self, mark_as_dirty_first: bool) -> bool {
        self.validate(mark_as_dirty_first, false)
    }

    /// Focus the first invalid field in this subtree. Returns `false` if
    /// nothing was invalid.
    fn focus_invalid(&self) -> bool {
        if self.is_invalid() {
            self.focus();
            true
        } else {
            false
        }
    }

    fn name(&self) -> Option<String> {
        self.core().name()
    }

    fn errors(&self) -> Vec<String> {
        self.core().errors()
    }

    fn is_valid(&self) -> bool {
        self.core().is_valid()
    }

    fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    fn is_pristine(&self) -> bool {
        !self.is_dirty()
    }

    fn is_dirty_and_invalid(&self) -> bool {
        self.is_dirty() && self.is_invalid()
    }

    /// Errors to show inline: only once the field is dirty.
    fn dirty_errors(&self) -> Vec<String> {
        if self.is_dirty() {
            self.errors()
        } else {
            Vec::new()
        }
    }

    fn add_error(&self, message: &str) {
        self.core().add_errors([message.to_string()]);
    }

    fn add_errors(&self, messages: Vec<String>) {
        self.core().add_errors(messages);
    }

    fn clear_errors(&self) {
        self.core().clear_errors();
    }

    /// Clear the errors of this field and of every field below it.
    fn clear_all_errors(&self) {
        self.clear_errors();
    }

    fn focus(&self) {
        self.core().focus();
    }

    fn bind_element(&self, element: ElementRef) {
        self.core().bind_element(element);
    }
}

/// Fluent configuration and typed conveniences for concrete fields.
///
/// ```
/// use formkit::prelude::*;
///
/// let email = field()
///     .with_name("Email")
///     .validator([rules::required(), rules::email()]);
/// email.set("not-an-email");
/// assert_eq!(email.errors(), vec!["Email must be a valid email address"]);
/// ```
pub trait FieldExt: Field + Sized {
    fn with_name(self, name: impl Into<String>) -> Self {
        self.core().set_name(Some(name.into()));
        self
    }

    /// Replace the rule set.
    fn validator(self, rules: impl IntoIterator<Item = ValidationRule>) -> Self {
        self.core().set_validator(Validator::new(rules));
        self
    }

    fn with_validator(self, validator: Validator) -> Self {
        self.core().set_validator(validator);
        self
    }

    /// Add (or replace by name) one rule.
    fn rule(self, rule: ValidationRule) -> Self {
        self.core().add_rules([rule]);
        self
    }

    fn validate_on_change(self, enabled: bool) -> Self {
        self.core().set_validate_on_change(enabled);
        self
    }

    fn abort_early(self, enabled: bool) -> Self {
        self.core().set_abort_early(enabled);
        self
    }

    fn with_scheduler(self, scheduler: Scheduler) -> Self {
        self.core().set_scheduler(scheduler);
        self
    }

    fn with_config(self, config: &FormConfig) -> Self {
        self.core().apply_config(config);
        self
    }

    /// `set_value(Some(value), true)`.
    fn set(&self, value: impl Into<Value>) {
        self.set_value(Some(value.into()), true);
    }

    fn on_change<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&Option<Value>) + Send + Sync + 'static,
    {
        self.core().on_change(handler)
    }

    fn on_reset<F>(&self, handler: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.core().on_reset(handler)
    }

    fn into_dyn(self) -> Arc<dyn Field>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<T: Field> FieldExt for T {}
