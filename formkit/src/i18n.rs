//! Translation of rule messages.
//!
//! Rule messages are treated as translation keys. When a translator is
//! configured, the validator looks the message up before interpolating its
//! placeholders; unknown keys fall back to the message itself.

use std::collections::HashMap;

/// Translation-by-key capability supplied by the host application.
pub trait Translate: Send + Sync {
    /// Returns the translated template for `key`, or `None` if unknown.
    fn translate(&self, key: &str) -> Option<String>;
}

/// In-memory message catalog, keyed by the untranslated rule template.
///
/// ```
/// use formkit::i18n::Catalog;
/// use formkit::validation::{Validator, rules};
///
/// let catalog = Catalog::new().entry("{1:'This field'} is required", "{1:'Dieses Feld'} ist erforderlich");
/// let validator = Validator::new([rules::required()]).with_translator(catalog);
///
/// let errors = validator.validate(None, true, &[]);
/// assert_eq!(errors[0].message, "Dieses Feld ist erforderlich");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.entries.insert(key.into(), template.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

impl<F> Translate for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn translate(&self, key: &str) -> Option<String> {
        self(key)
    }
}
