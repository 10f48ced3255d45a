//! modhost - Dynamic module hosting for extension-based applications
//!
//! This crate provides the infrastructure for applications assembled out of
//! dynamically loaded modules: non-owning back-references between parts,
//! owning collections with deterministic teardown, a checked wrapper around
//! platform dynamic libraries, and loaders that drive whole module trees
//! through an explicit load/unload lifecycle.
//!
//! ## Layers
//!
//! 1. [`backref`] / [`extension`] - identity plumbing: rebindable non-owning
//!    references and the owner-fixed-at-construction rule
//! 2. [`collection`] - owning slot collections and the extension stack with
//!    reverse-insertion-order teardown
//! 3. [`library`] - dynamic library loading with a strict failure taxonomy
//! 4. [`module`] - modules, the exported hook contract, loaders, discovery
//!
//! ## Example
//!
//! ```no_run
//! use modhost::{DynamicLoader, Module};
//!
//! fn main() -> modhost::Result<()> {
//!     let mut loader = DynamicLoader::new("/opt/app/modules/host.so");
//!     loader.attach_discovered("/opt/app/modules/ext")?;
//!     loader.load()?;
//!
//!     let info = loader.info()?;
//!     println!("{} {} by {}", info.name, info.version, info.author);
//!
//!     loader.unload()
//! }
//! ```

pub mod backref;
pub mod collection;
pub mod config;
pub mod error;
pub mod extension;
pub mod library;
pub mod module;
pub mod utils;

pub use backref::BackRef;
pub use collection::{ExtensionStack, OwnedSlots, Slot};
pub use config::load_module_config;
pub use error::{Error, Result};
pub use extension::{Extension, OwnerId, OwnerRef};
pub use library::DynamicLibrary;
pub use module::{
    discover_modules, DynamicLoader, DynamicModule, Module, ModuleInfo, ModuleInfoHook,
    ModuleLifecycleHook, ON_MODULE_INFO, ON_MODULE_LOAD, ON_MODULE_UNLOAD,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_surface_composes() {
        let loader = DynamicLoader::new("/opt/app/modules/host.so");
        assert!(loader.is_unloaded());
        assert!(loader.modules().is_empty());
        // No library mapped yet, so the metadata export is unreachable.
        assert!(loader.info().is_err());
    }

    #[test]
    fn test_backref_defaults_empty() {
        let reference: BackRef<OwnerId> = BackRef::new();
        assert!(reference.is_empty());
        assert!(matches!(reference.get(), Err(Error::EmptyReference)));
    }
}
