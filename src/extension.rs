//! Extension identity and owner awareness
//!
//! Extensions are polymorphic nodes living in an ownership tree: an owning
//! collection holds them exclusively, and each node carries a back-reference
//! to its owner, fixed at construction. Ownership awareness is composed in
//! through [`OwnerRef`] rather than inherited; the owner side is represented
//! by a shared [`OwnerId`] identity token whose liveness tracks the owning
//! collection exactly.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::backref::BackRef;
use crate::error::Result;

/// Identity token of an owning collection.
///
/// The collection keeps the only strong handle; everything it owns holds
/// weak back-references. Once the collection is gone the token dies with it
/// and every dangling back-reference reads empty.
#[derive(Debug)]
pub struct OwnerId {
    label: String,
}

impl OwnerId {
    /// Creates a fresh identity. Identity lives in the allocation, so the
    /// token is born shared.
    pub fn new(label: impl Into<String>) -> Arc<OwnerId> {
        Arc::new(OwnerId {
            label: label.into(),
        })
    }

    /// Diagnostic label of the owner, e.g. the loader's module name.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// An owner back-reference that is fixed at construction.
///
/// There is deliberately no rebinding API: an object's owner never changes
/// over its lifetime. Detached (root) objects carry an empty reference.
pub struct OwnerRef<O: ?Sized = OwnerId> {
    owner: BackRef<O>,
}

impl<O: ?Sized> OwnerRef<O> {
    /// Wraps the back-reference handed over by the owning collection.
    pub fn new(owner: BackRef<O>) -> Self {
        OwnerRef { owner }
    }

    /// An empty owner reference for objects constructed outside any
    /// collection.
    pub fn detached() -> Self {
        OwnerRef {
            owner: BackRef::new(),
        }
    }

    /// True when there is no live owner.
    pub fn is_detached(&self) -> bool {
        self.owner.is_empty()
    }

    /// Dereferences the owner; fails with [`crate::Error::EmptyReference`]
    /// when detached or when the owner has been dropped.
    pub fn get(&self) -> Result<Arc<O>> {
        self.owner.get()
    }

    /// Non-failing variant of [`OwnerRef::get`].
    pub fn try_get(&self) -> Option<Arc<O>> {
        self.owner.try_get()
    }
}

impl<O: ?Sized> fmt::Debug for OwnerRef<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnerRef").field(&self.owner).finish()
    }
}

/// A polymorphic node participating in an ownership tree.
pub trait Extension {
    /// The back-reference to the owning collection; empty for detached
    /// nodes.
    fn owner(&self) -> &OwnerRef;

    /// Runtime type name used in diagnostics. The default reports the
    /// implementing type's path; implementors may compose richer names.
    fn classname(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Downcast seam for typed access to concrete extension types.
    fn as_any(&self) -> &dyn Any;

    /// Mutable counterpart of [`Extension::as_any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
