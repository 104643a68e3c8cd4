//! Scoped ownership of native engine handles

use std::fmt;
use std::ops::{Deref, DerefMut};

use translation_worker_core::NativeHandle;

/// Owns a native handle and releases it exactly once when dropped
///
/// Dropping happens on every exit path, so vectors built for a batch are
/// released whether the engine call succeeded, failed or was never made.
pub struct NativeGuard<T: NativeHandle + ?Sized> {
    inner: Box<T>,
    label: &'static str,
}

impl<T: NativeHandle + ?Sized> NativeGuard<T> {
    pub fn new(inner: Box<T>, label: &'static str) -> Self {
        Self { inner, label }
    }
}

impl<T: NativeHandle + ?Sized> Deref for NativeGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: NativeHandle + ?Sized> DerefMut for NativeGuard<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: NativeHandle + ?Sized> Drop for NativeGuard<T> {
    fn drop(&mut self) {
        tracing::trace!(handle = self.label, "Releasing native handle");
        self.inner.release();
    }
}

impl<T: NativeHandle + ?Sized> fmt::Debug for NativeGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeGuard").field("label", &self.label).finish()
    }
}
