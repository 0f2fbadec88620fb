//! Built-in rules.
//!
//! Default messages use `{1:'This field'}` for the field name, so they read
//! well whether or not the field is named. Replace them with
//! [`ValidationRule::with_message`]; with a translator configured, the
//! message doubles as the translation key.
//!
//! String rules compare the [prepared](crate::text::StrExt::prepared) form of
//! the input, so surrounding and repeated whitespace never counts.

use super::format::escape;
use super::rule::ValidationRule;
use crate::text::StrExt;
use crate::value::Value;

/// Fails on absent values, blank strings, and empty lists or objects.
pub fn required() -> ValidationRule {
    ValidationRule::accepting_empty("required", "{1:'This field'} is required", |value, _| {
        match value {
            None => false,
            Some(Value::String(s)) => !s.is_blank(),
            Some(other) => !other.is_empty(),
        }
    })
}

/// At least `min` characters (strings) or items (lists).
pub fn min_length(min: usize) -> ValidationRule {
    ValidationRule::new(
        "min_length",
        format!("{{1:'This field'}} is too short (minimum {min})"),
        move |value, _| length_of(value) >= min,
    )
}

/// At most `max` characters (strings) or items (lists).
pub fn max_length(max: usize) -> ValidationRule {
    ValidationRule::new(
        "max_length",
        format!("{{1:'This field'}} is too long (maximum {max})"),
        move |value, _| length_of(value) <= max,
    )
}

/// Between `min` and `max` characters or items, inclusive.
pub fn length_between(min: usize, max: usize) -> ValidationRule {
    ValidationRule::new(
        "length_between",
        format!("{{1:'This field'}} must be between {min} and {max} long"),
        move |value, _| (min..=max).contains(&length_of(value)),
    )
}

/// The prepared string must match `pattern`.
pub fn pattern(pattern: &str) -> Result<ValidationRule, regex::Error> {
    let re = regex::Regex::new(pattern)?;
    Ok(ValidationRule::new(
        "pattern",
        "{1:'This field'} has an invalid format",
        move |value, _| re.is_match(&text_of(value)),
    ))
}

/// A syntactically valid email address.
pub fn email() -> ValidationRule {
    ValidationRule::new(
        "email",
        "{1:'This field'} must be a valid email address",
        |value, _| email_address::EmailAddress::is_valid(&text_of(value)),
    )
}

/// A number, or a string that parses as one.
pub fn numeric() -> ValidationRule {
    ValidationRule::new("numeric", "{1:'This field'} must be a number", |value, _| {
        number_of(value).is_some()
    })
}

/// An integral number, or a string that parses as one.
pub fn integer() -> ValidationRule {
    ValidationRule::new("integer", "{1:'This field'} must be a whole number", |value, _| {
        match value {
            Value::Int(_) | Value::BigInt(_) => true,
            Value::Float(f) => f.fract() == 0.0,
            Value::String(s) => s.parse_integer().is_some(),
            _ => false,
        }
    })
}

/// A number greater than or equal to `min`.
pub fn min(min: f64) -> ValidationRule {
    ValidationRule::new(
        "min",
        format!("{{1:'This field'}} must be at least {min}"),
        move |value, _| number_of(value).is_some_and(|n| n >= min),
    )
}

/// A number less than or equal to `max`.
pub fn max(max: f64) -> ValidationRule {
    ValidationRule::new(
        "max",
        format!("{{1:'This field'}} must be at most {max}"),
        move |value, _| number_of(value).is_some_and(|n| n <= max),
    )
}

/// A number in `min..=max`.
pub fn between(min: f64, max: f64) -> ValidationRule {
    ValidationRule::new(
        "between",
        format!("{{1:'This field'}} must be between {min} and {max}"),
        move |value, _| number_of(value).is_some_and(|n| (min..=max).contains(&n)),
    )
}

/// Exactly `Bool(true)`.
pub fn checked() -> ValidationRule {
    ValidationRule::accepting_empty("checked", "{1:'This field'} must be checked", |value, _| {
        matches!(value, Some(Value::Bool(true)))
    })
}

/// Equal to one of `options`.
pub fn one_of(options: impl IntoIterator<Item = impl Into<Value>>) -> ValidationRule {
    let options: Vec<Value> = options.into_iter().map(Into::into).collect();
    let listed = escape(&Value::List(options.clone()).to_string());
    ValidationRule::new(
        "one_of",
        format!("{{1:'This field'}} must be one of: {listed}"),
        move |value, _| options.contains(value),
    )
}

/// Equal to `expected`.
pub fn equals(expected: impl Into<Value>) -> ValidationRule {
    let expected = expected.into();
    let shown = escape(&expected.to_string());
    ValidationRule::new(
        "equals",
        format!("{{1:'This field'}} must equal {shown}"),
        move |value, _| *value == expected,
    )
}

/// Composite shorthand: the first failing rule in `rules` decides.
pub fn all_of(name: impl Into<String>, rules: impl IntoIterator<Item = ValidationRule>) -> ValidationRule {
    ValidationRule::composite(name, rules)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.prepared(),
        other => other.to_string(),
    }
}

fn length_of(value: &Value) -> usize {
    match value {
        Value::List(items) => items.len(),
        Value::Object(map) => map.len(),
        other => text_of(other).chars().count(),
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse_number(),
        other => other.as_f64(),
    }
}
