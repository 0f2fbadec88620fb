//! Form-wide configuration defaults.

use std::sync::{Arc, OnceLock, RwLock};

use crate::i18n::Translate;
use crate::schedule::Scheduler;

/// Defaults applied to fields that do not configure a setting themselves.
///
/// Settings resolve from the field, then its parent chain, then the
/// installed `FormConfig`.
///
/// # Example
///
/// ```
/// use formkit::FormConfig;
///
/// let config = FormConfig::new().validate_on_change(false).abort_early(false);
/// assert!(!config.validate_on_change);
/// ```
#[derive(Clone)]
pub struct FormConfig {
    /// Re-run validation whenever a field's value changes.
    pub validate_on_change: bool,

    /// Stop a field's validator at the first failing rule.
    pub abort_early: bool,

    /// Scheduler for deferred focus (None = [`Scheduler::global`]).
    pub scheduler: Option<Scheduler>,

    /// Translator applied to rule messages before formatting.
    pub translator: Option<Arc<dyn Translate>>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            validate_on_change: true,
            abort_early: true,
            scheduler: None,
            translator: None,
        }
    }
}

impl FormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate_on_change(mut self, enabled: bool) -> Self {
        self.validate_on_change = enabled;
        self
    }

    pub fn abort_early(mut self, enabled: bool) -> Self {
        self.abort_early = enabled;
        self
    }

    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn translator(mut self, translator: impl Translate + 'static) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    /// Make this configuration the process-wide default.
    pub fn install(self) {
        match installed().write() {
            Ok(mut guard) => *guard = self,
            Err(poisoned) => *poisoned.into_inner() = self,
        }
    }

    /// The installed process-wide defaults.
    pub fn current() -> FormConfig {
        installed()
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub(crate) fn resolved_scheduler(&self) -> Scheduler {
        self.scheduler.clone().unwrap_or_else(Scheduler::global)
    }
}

impl std::fmt::Debug for FormConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormConfig")
            .field("validate_on_change", &self.validate_on_change)
            .field("abort_early", &self.abort_early)
            .field("scheduler", &self.scheduler)
            .field("translator", &self.translator.is_some())
            .finish()
    }
}

fn installed() -> &'static RwLock<FormConfig> {
    static INSTALLED: OnceLock<RwLock<FormConfig>> = OnceLock::new();
    INSTALLED.get_or_init(|| RwLock::new(FormConfig::default()))
}
