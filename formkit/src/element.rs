//! Focus targets bound to fields by a UI layer.

use std::sync::Arc;

/// A UI control that can receive focus.
///
/// The UI binding assigns an element to a field when the control mounts;
/// the field only ever calls [`Element::focus`].
pub trait Element: Send + Sync {
    fn focus(&self);
}

/// Shared handle to a bound element.
pub type ElementRef = Arc<dyn Element>;

impl<F> Element for F
where
    F: Fn() + Send + Sync,
{
    fn focus(&self) {
        self()
    }
}
