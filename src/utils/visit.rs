//! Generic element traversal with optional filtering and early exit
//!
//! The loaders sequence their children with these helpers: walk a range,
//! apply an action to each element the predicate admits, and stop at the
//! first action that breaks, reporting what triggered the stop. Reverse
//! traversal is the same call over a reversed iterator.

use std::ops::ControlFlow;

/// Applies `action` to every element of `items`, stopping at the first
/// [`ControlFlow::Break`] and returning its payload.
///
/// `None` means the traversal visited everything without breaking. The break
/// payload is how callers report *which* element (or which failure) stopped
/// the walk; early-exit search is `Break(element)`.
pub fn visit<I, B, A>(items: I, action: A) -> Option<B>
where
    I: IntoIterator,
    A: FnMut(I::Item) -> ControlFlow<B>,
{
    visit_filtered(items, |_| true, action)
}

/// As [`visit`], but `action` only runs for elements where `filter` holds;
/// everything else is skipped without effect.
pub fn visit_filtered<I, B, P, A>(items: I, mut filter: P, mut action: A) -> Option<B>
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
    A: FnMut(I::Item) -> ControlFlow<B>,
{
    for item in items {
        if !filter(&item) {
            continue;
        }
        if let ControlFlow::Break(payload) = action(item) {
            return Some(payload);
        }
    }
    None
}
