//! Insertion-ordered, exclusively-owning slot sequence
//!
//! [`OwnedSlots`] owns heap-allocated polymorphic values in insertion order.
//! A slot that is present may still be empty: holding no value is a distinct,
//! observable state and not the same as being out of bounds. Checked access
//! reports each of the two conditions with its own error kind; unchecked
//! access exists as a documented escape hatch for hot paths.

use crate::error::{Error, Result};

/// One position in the sequence: either a value or an empty placeholder.
pub type Slot<T> = Option<Box<T>>;

/// An insertion-ordered sequence of exclusively-owned boxed values.
///
/// Assignment moves the whole backing sequence; there is no `Clone` because
/// exclusive ownership of the values has no copy.
#[derive(Debug, PartialEq, Eq)]
pub struct OwnedSlots<T: ?Sized> {
    slots: Vec<Slot<T>>,
}

impl<T: ?Sized> OwnedSlots<T> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        OwnedSlots { slots: Vec::new() }
    }

    /// Number of slots, empty placeholders included. O(1).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no slot exists at all. O(1).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Checked slot access.
    ///
    /// Fails with [`Error::OutOfRange`] carrying the offending index when
    /// `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&Slot<T>> {
        let len = self.slots.len();
        self.slots
            .get(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// Checked mutable slot access; same failure contract as
    /// [`OwnedSlots::at`].
    pub fn at_mut(&mut self, index: usize) -> Result<&mut Slot<T>> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// Unchecked slot access for hot loops.
    ///
    /// # Safety
    ///
    /// `index` must be in bounds; calling this with `index >= len()` is
    /// undefined behavior.
    pub unsafe fn at_unchecked(&self, index: usize) -> &Slot<T> {
        self.slots.get_unchecked(index)
    }

    /// Unchecked mutable slot access.
    ///
    /// # Safety
    ///
    /// Same contract as [`OwnedSlots::at_unchecked`].
    pub unsafe fn at_unchecked_mut(&mut self, index: usize) -> &mut Slot<T> {
        self.slots.get_unchecked_mut(index)
    }

    /// Dereferences the value held at `index`.
    ///
    /// Fails with [`Error::OutOfRange`] past the end and with
    /// [`Error::EmptySlot`] when the slot is present but holds no value.
    pub fn value(&self, index: usize) -> Result<&T> {
        self.at(index)?
            .as_deref()
            .ok_or(Error::EmptySlot { index })
    }

    /// Mutable counterpart of [`OwnedSlots::value`].
    pub fn value_mut(&mut self, index: usize) -> Result<&mut T> {
        self.at_mut(index)?
            .as_deref_mut()
            .ok_or(Error::EmptySlot { index })
    }

    /// Appends a value at the end.
    pub fn push(&mut self, value: Box<T>) {
        self.slots.push(Some(value));
    }

    /// Appends a slot at the end; `None` inserts an empty placeholder.
    pub fn push_slot(&mut self, slot: Slot<T>) {
        self.slots.push(slot);
    }

    /// Removes and returns the newest slot.
    pub fn pop(&mut self) -> Option<Slot<T>> {
        self.slots.pop()
    }

    /// The newest slot, if any.
    pub fn last_mut(&mut self) -> Option<&mut Slot<T>> {
        self.slots.last_mut()
    }

    /// Double-ended iteration over slots in insertion order; `.rev()` walks
    /// newest-first.
    pub fn iter(&self) -> std::slice::Iter<'_, Slot<T>> {
        self.slots.iter()
    }

    /// Mutable counterpart of [`OwnedSlots::iter`].
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Slot<T>> {
        self.slots.iter_mut()
    }
}

impl<T: ?Sized> Default for OwnedSlots<T> {
    fn default() -> Self {
        OwnedSlots::new()
    }
}

impl<'a, T: ?Sized> IntoIterator for &'a OwnedSlots<T> {
    type Item = &'a Slot<T>;
    type IntoIter = std::slice::Iter<'a, Slot<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: ?Sized> IntoIterator for &'a mut OwnedSlots<T> {
    type Item = &'a mut Slot<T>;
    type IntoIter = std::slice::IterMut<'a, Slot<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OwnedSlots<u32> {
        let mut slots = OwnedSlots::new();
        slots.push(Box::new(10));
        slots.push_slot(None);
        slots.push(Box::new(30));
        slots
    }

    #[test]
    fn test_len_counts_empty_slots() {
        let slots = sample();
        assert_eq!(slots.len(), 3);
        assert!(!slots.is_empty());
        assert!(OwnedSlots::<u32>::new().is_empty());
    }

    #[test]
    fn test_at_checks_bounds() {
        let slots = sample();
        assert!(slots.at(0).is_ok());
        assert!(slots.at(2).is_ok());
        match slots.at(3) {
            Err(Error::OutOfRange { index, len }) => {
                assert_eq!(index, 3);
                assert_eq!(len, 3);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_value_distinguishes_empty_from_absent() {
        let slots = sample();
        assert_eq!(*slots.value(0).unwrap(), 10);
        assert!(matches!(slots.value(1), Err(Error::EmptySlot { index: 1 })));
        assert!(matches!(slots.value(9), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_value_mut_writes_through() {
        let mut slots = sample();
        *slots.value_mut(2).unwrap() = 31;
        assert_eq!(*slots.value(2).unwrap(), 31);
    }

    #[test]
    fn test_unchecked_access_in_bounds() {
        let slots = sample();
        // SAFETY: 0 < len
        let slot = unsafe { slots.at_unchecked(0) };
        assert_eq!(slot.as_deref(), Some(&10));
    }

    #[test]
    fn test_iteration_forward_and_reverse() {
        let slots = sample();
        let forward: Vec<Option<u32>> = slots.iter().map(|s| s.as_deref().copied()).collect();
        assert_eq!(forward, vec![Some(10), None, Some(30)]);

        let reverse: Vec<Option<u32>> =
            slots.iter().rev().map(|s| s.as_deref().copied()).collect();
        assert_eq!(reverse, vec![Some(30), None, Some(10)]);
    }

    #[test]
    fn test_equality_is_element_wise() {
        assert_eq!(sample(), sample());

        let mut shorter = OwnedSlots::new();
        shorter.push(Box::new(10));
        assert_ne!(sample(), shorter);

        let mut null_moved = OwnedSlots::new();
        null_moved.push_slot(None);
        null_moved.push(Box::new(10));
        null_moved.push(Box::new(30));
        assert_ne!(sample(), null_moved);
    }

    #[test]
    fn test_move_assignment_replaces_sequence() {
        let mut target = OwnedSlots::new();
        target.push(Box::new(1u32));
        target = sample();
        assert_eq!(target.len(), 3);
        assert_eq!(*target.value(0).unwrap(), 10);
    }

    #[test]
    fn test_pop_returns_newest() {
        let mut slots = sample();
        assert_eq!(slots.pop().unwrap().as_deref(), Some(&30));
        assert_eq!(slots.pop().unwrap(), None);
        assert_eq!(slots.len(), 1);
    }
}
