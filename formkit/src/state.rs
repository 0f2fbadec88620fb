use std::sync::{Arc, RwLock};

use crate::event::{EventEmitter, ListenerId};

/// Reactive state cell with interior mutability.
///
/// `State<T>` uses `Arc<RwLock<T>>` internally, making it cheap to clone and
/// safe to share between a field and the UI binding that renders it. Every
/// `set`/`update` notifies subscribers with the new value after the write
/// lock has been released.
///
/// # Example
///
/// ```
/// use formkit::State;
///
/// let count = State::new(1);
/// count.update(|v| *v += 1);
/// assert_eq!(count.get(), 2);
/// ```
#[derive(Debug)]
pub struct State<T> {
    inner: Arc<RwLock<T>>,
    changed: EventEmitter<T>,
}

impl<T> State<T> {
    /// Create a new state with the given value
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
            changed: EventEmitter::new(),
        }
    }

    /// Get a clone of the current value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// Set a new value and notify subscribers
    pub fn set(&self, value: T)
    where
        T: Clone,
    {
        let snapshot = value.clone();
        match self.inner.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
        self.changed.emit(&snapshot);
    }

    /// Update the value using a closure and notify subscribers
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
        T: Clone,
    {
        let snapshot = match self.inner.write() {
            Ok(mut guard) => {
                f(&mut guard);
                guard.clone()
            }
            Err(poisoned) => {
                let mut guard = poisoned.into_inner();
                f(&mut guard);
                guard.clone()
            }
        };
        self.changed.emit(&snapshot);
    }

    /// Observe every subsequent change
    pub fn subscribe<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.changed.subscribe(f)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.changed.unsubscribe(id)
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            changed: self.changed.clone(),
        }
    }
}

impl<T: Default> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Derived cell whose value is recomputed from its sources on every read.
///
/// Recomputing on read keeps a `Computed` consistent with its dependencies
/// without tracking them explicitly.
///
/// ```
/// use formkit::{Computed, State};
///
/// let errors: State<Vec<String>> = State::default();
/// let source = errors.clone();
/// let valid = Computed::new(move || source.with(|e| e.is_empty()));
/// assert!(valid.get());
/// errors.set(vec!["bad".into()]);
/// assert!(!valid.get());
/// ```
pub struct Computed<T> {
    compute: Arc<dyn Fn() -> T + Send + Sync>,
}

impl<T> Computed<T> {
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            compute: Arc::new(compute),
        }
    }

    pub fn get(&self) -> T {
        (self.compute)()
    }
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            compute: Arc::clone(&self.compute),
        }
    }
}

impl<T> std::fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed").finish_non_exhaustive()
    }
}
