//! Reactive form fields.
//!
//! Three kinds of field share the [`Field`] contract:
//!
//! - [`FormField`] holds a single value.
//! - [`FormFieldGroup`] holds named children and exposes an object value.
//! - [`FormFieldArray`] holds a variable list of items cloned from a
//!   template and exposes a list value.
//!
//! Composites aggregate dirtiness, validity and errors from their children
//! and re-emit their children's `change` events as their own. Settings such
//! as validate-on-change are inherited down the tree unless a child sets
//! them itself.

mod array;
mod base;
mod field;
mod group;

pub use array::{FormFieldArray, ItemChange};
pub use base::{Field, FieldCore, FieldExt, FieldId};
pub use field::{FormField, Transform};
pub use group::{FieldChange, FormFieldGroup, GroupBuilder};

/// An empty [`FormField`].
pub fn field() -> FormField {
    FormField::new()
}

/// Start building a [`FormFieldGroup`].
pub fn field_group() -> GroupBuilder {
    GroupBuilder::new()
}

/// An empty [`FormFieldArray`] whose items are copies of `template`.
pub fn field_array(template: impl Field + 'static) -> FormFieldArray {
    FormFieldArray::new(template)
}
