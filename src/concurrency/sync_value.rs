//! `SyncValue`: callback-scoped shared or exclusive access to a value.
//!
//! The collections in this crate do no locking of their own. Wrap one in a
//! `SyncValue` to share it between threads: every whole operation runs inside a
//! callback that holds the lock, and the lock is released when the callback
//! returns or unwinds.

use parking_lot::RwLock;

/// A value behind a reader-writer lock, reachable only through callbacks.
///
/// References handed to the callbacks must not escape them; the borrow checker
/// enforces this.
#[derive(Debug, Default)]
pub struct SyncValue<T> {
    inner: RwLock<T>,
}

impl<T> SyncValue<T> {
    /// Wraps `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    /// Runs `f` with exclusive access to the value.
    #[inline]
    pub fn mutate<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut guard)
    }

    /// Runs `f` with shared access. Readers do not block each other.
    #[inline]
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.read(T::clone)
    }

    /// Swaps in `value`, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.mutate(|slot| core::mem::replace(slot, value))
    }

    /// Direct access when the wrapper itself is held exclusively.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Unwraps the value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T> From<T> for SyncValue<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
