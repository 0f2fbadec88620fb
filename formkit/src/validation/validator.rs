//! Ordered, name-keyed rule set.

use std::sync::Arc;

use log::trace;

use super::error::{AggregateValidationError, ValidationError, ValidationFailure};
use super::format::format_message;
use super::rule::ValidationRule;
use crate::i18n::Translate;
use crate::value::Value;

/// Runs a set of [`ValidationRule`]s against a value.
///
/// Rules run in insertion order. Names are unique: adding a rule whose name
/// is already registered replaces the old rule in place.
///
/// # Example
///
/// ```
/// use formkit::validation::{rules, Validator};
///
/// let validator = Validator::new([rules::required(), rules::min_length(3)]);
/// let errors = validator.validate(Some(&"ab".into()), true, &[Some("Username".into())]);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].rule, "min_length");
/// ```
#[derive(Clone, Default)]
pub struct Validator {
    rules: Vec<ValidationRule>,
    translator: Option<Arc<dyn Translate>>,
}

impl Validator {
    /// Create a validator. Later rules replace earlier ones with the same name.
    pub fn new(rules: impl IntoIterator<Item = ValidationRule>) -> Self {
        let mut validator = Self::default();
        validator.add_rules(rules);
        validator
    }

    /// Translate messages with `translator` before formatting them.
    pub fn with_translator(mut self, translator: impl Translate + 'static) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    pub fn add_rule(&mut self, rule: ValidationRule) {
        match self.rules.iter_mut().find(|r| r.name() == rule.name()) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = ValidationRule>) {
        for rule in rules {
            self.add_rule(rule);
        }
    }

    pub fn remove_rules<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.rules.retain(|rule| rule.name() != name.as_ref());
        }
    }

    pub fn remove_all_rules(&mut self) {
        self.rules.clear();
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name() == name)
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate `value`, returning one error per failed rule.
    ///
    /// With `abort_early` only the first failure is returned.
    pub fn validate(
        &self,
        value: Option<&Value>,
        abort_early: bool,
        args: &[Option<Value>],
    ) -> Vec<ValidationError> {
        self.run(value, abort_early, args, None)
    }

    /// Like [`Validator::validate`], but as a `Result`.
    ///
    /// One failure yields [`ValidationFailure::Single`], several yield
    /// [`ValidationFailure::Aggregate`].
    pub fn try_validate(
        &self,
        value: Option<&Value>,
        abort_early: bool,
        args: &[Option<Value>],
    ) -> Result<(), ValidationFailure> {
        let mut errors = self.validate(value, abort_early, args);
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0).into()),
            _ => Err(AggregateValidationError::new(errors).into()),
        }
    }

    /// Validate using this validator's translator, or `fallback` if it has none.
    pub(crate) fn run(
        &self,
        value: Option<&Value>,
        abort_early: bool,
        args: &[Option<Value>],
        fallback: Option<&dyn Translate>,
    ) -> Vec<ValidationError> {
        let translator = self.translator.as_deref().or(fallback);
        let mut format_args = Vec::with_capacity(args.len() + 1);
        format_args.push(value.cloned());
        format_args.extend_from_slice(args);

        let mut errors = Vec::new();
        for rule in &self.rules {
            let Some(failed) = rule.failing(value, args) else {
                continue;
            };
            let template = translator
                .and_then(|t| t.translate(failed.message()))
                .unwrap_or_else(|| failed.message().to_string());
            trace!("Rule '{}' failed", failed.name());
            errors.push(ValidationError::new(
                format_message(&template, &format_args),
                failed.name(),
            ));
            if abort_early {
                break;
            }
        }
        errors
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules)
            .field("translator", &self.translator.is_some())
            .finish()
    }
}
