//! Non-owning, rebindable back-references
//!
//! [`BackRef`] lets a long-lived object hand its identity to shorter-lived
//! dependents without transferring ownership. The handle may be empty, may be
//! rebound or cleared at any time, and observing an empty handle is always
//! well-defined: [`BackRef::get`] fails loudly instead of dangling, including
//! after the target has been dropped.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{Error, Result};

/// A checked, non-owning handle to a value kept alive elsewhere as an
/// [`Arc`].
///
/// Cloning aliases the same target. Equality compares target identity, never
/// the pointed-to value; two empty handles compare equal. Dropping a
/// `BackRef` never affects the target.
pub struct BackRef<T: ?Sized> {
    target: Option<Weak<T>>,
}

impl<T: ?Sized> BackRef<T> {
    /// Creates an empty handle.
    pub fn new() -> Self {
        BackRef { target: None }
    }

    /// Creates a handle already bound to `target`.
    pub fn to(target: &Arc<T>) -> Self {
        BackRef {
            target: Some(Arc::downgrade(target)),
        }
    }

    /// Rebinds the handle to `target`, replacing any previous referent.
    /// Never fails.
    pub fn bind(&mut self, target: &Arc<T>) {
        self.target = Some(Arc::downgrade(target));
    }

    /// Returns the handle to the empty state. Never fails.
    pub fn clear(&mut self) {
        self.target = None;
    }

    /// True when the handle was never bound, was cleared, or its target has
    /// since been dropped.
    pub fn is_empty(&self) -> bool {
        match &self.target {
            Some(weak) => weak.strong_count() == 0,
            None => true,
        }
    }

    /// Dereferences the handle.
    ///
    /// The returned [`Arc`] keeps the target alive only for as long as the
    /// caller holds it. Fails with [`Error::EmptyReference`] when the handle
    /// is empty or the target is gone.
    pub fn get(&self) -> Result<Arc<T>> {
        self.try_get().ok_or(Error::EmptyReference)
    }

    /// Non-failing variant of [`BackRef::get`].
    pub fn try_get(&self) -> Option<Arc<T>> {
        self.target.as_ref().and_then(Weak::upgrade)
    }
}

impl<T: ?Sized> Default for BackRef<T> {
    fn default() -> Self {
        BackRef::new()
    }
}

impl<T: ?Sized> Clone for BackRef<T> {
    fn clone(&self) -> Self {
        BackRef {
            target: self.target.clone(),
        }
    }
}

/// Target identity, not value equality.
impl<T: ?Sized> PartialEq for BackRef<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.target, &other.target) {
            (Some(a), Some(b)) => Weak::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ?Sized> Eq for BackRef<T> {}

impl<T: ?Sized> fmt::Debug for BackRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("BackRef(empty)")
        } else {
            f.write_str("BackRef(engaged)")
        }
    }
}
