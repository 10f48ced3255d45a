//! Owning extension stack with reverse-order teardown
//!
//! [`ExtensionStack`] specializes [`OwnedSlots`] for extension values and
//! adds the two guarantees loaders rely on: elements are destroyed in exactly
//! the reverse of their insertion order, and every attached element receives
//! a back-reference to the stack's identity, fixed at construction. The
//! identity token outlives the drained elements, so an element may still
//! observe its owner while being dropped.

use std::sync::Arc;

use crate::backref::BackRef;
use crate::collection::slots::{OwnedSlots, Slot};
use crate::error::Result;
use crate::extension::{Extension, OwnerId};

/// An insertion-ordered owning stack of polymorphic extension values.
pub struct ExtensionStack<T: Extension + ?Sized> {
    slots: OwnedSlots<T>,
    identity: Arc<OwnerId>,
}

impl<T: Extension + ?Sized> ExtensionStack<T> {
    /// Creates an empty stack whose identity carries `label` for
    /// diagnostics.
    pub fn new(label: impl Into<String>) -> Self {
        ExtensionStack {
            slots: OwnedSlots::new(),
            identity: OwnerId::new(label),
        }
    }

    /// The stack's identity token.
    pub fn identity(&self) -> &OwnerId {
        &self.identity
    }

    /// A fresh back-reference bound to this stack's identity. Elements
    /// constructed through [`attach`](ExtensionStack::attach) receive one
    /// automatically.
    pub fn owner_ref(&self) -> BackRef<OwnerId> {
        BackRef::to(&self.identity)
    }

    /// Number of slots, empty placeholders included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the stack holds no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Checked slot access; see [`OwnedSlots::at`].
    pub fn at(&self, index: usize) -> Result<&Slot<T>> {
        self.slots.at(index)
    }

    /// Dereferences the element at `index`; see [`OwnedSlots::value`].
    pub fn value(&self, index: usize) -> Result<&T> {
        self.slots.value(index)
    }

    /// Mutable counterpart of [`ExtensionStack::value`].
    pub fn value_mut(&mut self, index: usize) -> Result<&mut T> {
        self.slots.value_mut(index)
    }

    /// Appends an already-boxed element.
    pub fn push_boxed(&mut self, value: Box<T>) {
        self.slots.push(value);
    }

    /// Appends a slot; `None` inserts an empty placeholder.
    pub fn push_slot(&mut self, slot: Slot<T>) {
        self.slots.push_slot(slot);
    }

    /// Iterates slots in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Slot<T>> {
        self.slots.iter()
    }

    /// Mutable counterpart of [`ExtensionStack::iter`].
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Slot<T>> {
        self.slots.iter_mut()
    }

    /// Typed mutable reference to the just-pushed element.
    ///
    /// Callers must have pushed a `Some` slot holding a `C` immediately
    /// before; both lookups hold by construction then.
    pub(crate) fn newest_as<C: 'static>(&mut self) -> &mut C {
        self.slots
            .last_mut()
            .and_then(Option::as_deref_mut)
            .and_then(|ext| ext.as_any_mut().downcast_mut::<C>())
            .expect("freshly attached slot holds its concrete type")
    }
}

impl ExtensionStack<dyn Extension> {
    /// Constructs an extension in place and appends it.
    ///
    /// `build` receives a back-reference to this stack's identity so the
    /// element's owner is fixed at construction. Returns a typed reference
    /// to the freshly inserted element. If `build` panics nothing has been
    /// appended.
    pub fn attach<C, F>(&mut self, build: F) -> &mut C
    where
        C: Extension + 'static,
        F: FnOnce(BackRef<OwnerId>) -> C,
    {
        let extension = build(self.owner_ref());
        self.push_boxed(Box::new(extension));
        self.newest_as::<C>()
    }
}

impl<T: Extension + ?Sized> Drop for ExtensionStack<T> {
    fn drop(&mut self) {
        // Teardown runs newest-first, the reverse of insertion order.
        while self.slots.pop().is_some() {}
    }
}
