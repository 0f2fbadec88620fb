//! Named, composable validation predicates.

use std::sync::Arc;

use crate::value::Value;

/// Type alias for rule test closures.
///
/// Receives the value under validation (absent for empty fields) and the
/// caller-supplied arguments.
type RuleTest = Arc<dyn Fn(Option<&Value>, &[Option<Value>]) -> bool + Send + Sync>;

#[derive(Clone)]
enum RuleKind {
    Test(RuleTest),
    Composite(Vec<ValidationRule>),
}

/// A named predicate plus a failure message template.
///
/// The message may use the placeholders described in
/// [`format_message`](super::format_message); argument 0 is the validated
/// value, argument 1 is usually the field name.
///
/// # Example
///
/// ```
/// use formkit::validation::ValidationRule;
///
/// let even = ValidationRule::new("even", "{1:'value'} must be even", |v, _| {
///     v.as_f64().is_some_and(|n| n % 2.0 == 0.0)
/// });
/// assert!(even.test(Some(&4i64.into()), &[]));
/// assert!(!even.test(Some(&3i64.into()), &[]));
/// // Absent values are skipped.
/// assert!(even.test(None, &[]));
/// ```
#[derive(Clone)]
pub struct ValidationRule {
    name: String,
    message: String,
    accept_empty: bool,
    kind: RuleKind,
}

impl ValidationRule {
    /// Create a rule that only sees present values.
    ///
    /// Absent values are skipped (treated as passing).
    pub fn new<F>(name: impl Into<String>, message: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value, &[Option<Value>]) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            message: message.into(),
            accept_empty: false,
            kind: RuleKind::Test(Arc::new(move |value, args| match value {
                Some(value) => test(value, args),
                None => true,
            })),
        }
    }

    /// Create a rule that is also tested against absent values.
    pub fn accepting_empty<F>(name: impl Into<String>, message: impl Into<String>, test: F) -> Self
    where
        F: Fn(Option<&Value>, &[Option<Value>]) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            message: message.into(),
            accept_empty: true,
            kind: RuleKind::Test(Arc::new(test)),
        }
    }

    /// Combine `rules` into one rule that fails with the first failing
    /// sub-rule. Sub-rules keep their own empty-value handling.
    pub fn composite(name: impl Into<String>, rules: impl IntoIterator<Item = ValidationRule>) -> Self {
        Self {
            name: name.into(),
            message: String::new(),
            accept_empty: true,
            kind: RuleKind::Composite(rules.into_iter().collect()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn accepts_empty(&self) -> bool {
        self.accept_empty
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, RuleKind::Composite(_))
    }

    /// Sub-rules of a composite rule (empty for plain rules).
    pub fn sub_rules(&self) -> &[ValidationRule] {
        match &self.kind {
            RuleKind::Composite(rules) => rules,
            RuleKind::Test(_) => &[],
        }
    }

    /// Replace the message template.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Register the rule under a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// `true` if `value` passes.
    pub fn test(&self, value: Option<&Value>, args: &[Option<Value>]) -> bool {
        self.failing(value, args).is_none()
    }

    /// The rule whose message should be reported, if `value` fails.
    ///
    /// For a composite this is the first failing sub-rule.
    pub(crate) fn failing(&self, value: Option<&Value>, args: &[Option<Value>]) -> Option<&ValidationRule> {
        if value.is_none() && !self.accept_empty {
            return None;
        }
        match &self.kind {
            RuleKind::Test(test) => (!test(value, args)).then_some(self),
            RuleKind::Composite(rules) => rules.iter().find_map(|rule| rule.failing(value, args)),
        }
    }
}

impl std::fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("accept_empty", &self.accept_empty)
            .field("sub_rules", &self.sub_rules().len())
            .finish()
    }
}
