//! Validation error types

/// A single named rule failure with its formatted message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Formatted, human-readable message.
    pub message: String,
    /// Name of the rule that failed.
    pub rule: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            rule: rule.into(),
        }
    }
}

/// Several rule failures, in the order they were found.
///
/// Its message is the newline-joined concatenation of the underlying
/// messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.errors))]
pub struct AggregateValidationError {
    pub errors: Vec<ValidationError>,
}

impl AggregateValidationError {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

/// Error returned by [`Validator::try_validate`](super::Validator::try_validate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// Exactly one rule failed.
    #[error(transparent)]
    Single(#[from] ValidationError),

    /// More than one rule failed.
    #[error(transparent)]
    Aggregate(#[from] AggregateValidationError),
}

impl ValidationFailure {
    /// All underlying failures.
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Single(error) => std::slice::from_ref(error),
            Self::Aggregate(aggregate) => &aggregate.errors,
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
