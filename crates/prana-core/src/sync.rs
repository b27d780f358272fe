//! Synchronization utilities for handling poisoned locks.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Extension trait for `Mutex` that ignores lock poisoning.
///
/// A poisoned lock means another thread panicked while holding it; the panic
/// is the real failure, so callers here take the guard regardless.
pub trait IgnoreLock<T> {
    /// Lock the mutex, ignoring any poison error.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnoreLock<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Extension trait for `RwLock` that ignores lock poisoning.
pub trait IgnoreRwLock<T> {
    /// Acquire a shared read guard, ignoring any poison error.
    fn read_ignore_poison(&self) -> RwLockReadGuard<'_, T>;

    /// Acquire an exclusive write guard, ignoring any poison error.
    fn write_ignore_poison(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> IgnoreRwLock<T> for RwLock<T> {
    fn read_ignore_poison(&self) -> RwLockReadGuard<'_, T> {
        match self.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_ignore_poison(&self) -> RwLockWriteGuard<'_, T> {
        match self.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
