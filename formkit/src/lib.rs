//! Reactive form fields with rule-based validation.
//!
//! ```
//! use formkit::prelude::*;
//!
//! let signup = field_group()
//!     .field("email", field().validator([rules::required(), rules::email()]))
//!     .field("age", field().validator([rules::integer(), rules::min(18.0)]))
//!     .build();
//!
//! signup.set(Value::from_json(serde_json::json!({ "email": "kari@example.com", "age": 17 })).unwrap());
//! assert!(!signup.validate(true, false));
//! assert_eq!(signup.errors(), vec!["age must be at least 18"]);
//! ```

pub mod config;
pub mod element;
pub mod event;
pub mod form;
pub mod i18n;
pub mod schedule;
pub mod state;
pub mod text;
pub mod validation;
pub mod value;

pub use config::FormConfig;
pub use form::{
    Field, FieldExt, FormField, FormFieldArray, FormFieldGroup, field, field_array, field_group,
};
pub use schedule::Scheduler;
pub use state::{Computed, State};
pub use value::Value;

pub mod prelude {
    pub use crate::config::FormConfig;
    pub use crate::element::{Element, ElementRef};
    pub use crate::event::ListenerId;
    pub use crate::form::{
        Field, FieldChange, FieldExt, FormField, FormFieldArray, FormFieldGroup, ItemChange,
        field, field_array, field_group,
    };
    pub use crate::i18n::{Catalog, Translate};
    pub use crate::schedule::Scheduler;
    pub use crate::state::{Computed, State};
    pub use crate::validation::{ValidationError, ValidationFailure, ValidationRule, Validator, rules};
    pub use crate::value::Value;
}
