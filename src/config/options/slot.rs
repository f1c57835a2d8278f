//! Atomically replaceable configuration snapshots

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;

/// Holds the live value of one configuration section.
///
/// Readers get an `Arc` snapshot that stays valid and unchanged while a
/// reload stores a new value (lock-free via `ArcSwap`).
pub struct ConfigSlot<T> {
    current: ArcSwap<T>,
}

impl<T> ConfigSlot<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: ArcSwap::from_pointee(value),
        }
    }

    /// Get a clone of the current snapshot
    pub fn load(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Replace the current value; existing snapshots are unaffected
    pub fn store(&self, value: T) {
        self.current.store(Arc::new(value));
    }
}

impl<T: Default> Default for ConfigSlot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for ConfigSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConfigSlot").field(&*self.current.load_full()).finish()
    }
}
