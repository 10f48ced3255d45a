//! Owning collections for polymorphic values
//!
//! Two layers: [`OwnedSlots`] is the plain insertion-ordered owning sequence
//! with checked and unchecked access; [`ExtensionStack`] specializes it for
//! extension values with reverse-order teardown and owner-aware attachment.

pub mod slots;
pub mod stack;

pub use slots::{OwnedSlots, Slot};
pub use stack::ExtensionStack;
