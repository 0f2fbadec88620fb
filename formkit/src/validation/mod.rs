//! Rule-based validation.
//!
//! A [`Validator`] owns an ordered, name-keyed set of [`ValidationRule`]s.
//! Running it yields a list of [`ValidationError`]s; rule failures are data,
//! not panics. [`Validator::try_validate`] offers the same check as a
//! `Result` for call sites that prefer `?`.
//!
//! # Example
//!
//! ```
//! use formkit::validation::{rules, Validator};
//!
//! let validator = Validator::new([rules::required(), rules::email()]);
//! let name = Some("Email".into());
//!
//! let errors = validator.validate(None, true, &[name.clone()]);
//! assert_eq!(errors[0].message, "Email is required");
//!
//! assert!(validator.try_validate(Some(&"jane@example.com".into()), true, &[name]).is_ok());
//! ```

mod error;
mod format;
mod rule;
pub mod rules;
mod validator;

pub use error::{AggregateValidationError, ValidationError, ValidationFailure};
pub use format::{escape, format_message};
pub use rule::ValidationRule;
pub use validator::Validator;
