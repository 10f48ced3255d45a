//! Dynamic module system
//!
//! Everything needed to host modules shipped as dynamic libraries:
//! metadata and the exported hook contract, the module lifecycle, loaders
//! that own trees of child modules, and filesystem discovery.
//!
//! ## Architecture
//!
//! - **Hook contract**: modules export `on_module_info` (required) plus
//!   `on_module_load` / `on_module_unload` (optional), resolved by name
//! - **Lifecycle**: a module is either loaded or unloaded; transitions are
//!   explicit and unloading twice is harmless
//! - **Ownership**: loaders own their children and destroy them newest
//!   first; children hold non-owning back-references to their loader
//! - **Composition**: a loader is itself a module, so trees nest

pub mod discovery;
pub mod dynamic;
pub mod info;
pub mod loader;

pub use discovery::discover_modules;
pub use dynamic::{DynamicModule, Module};
pub use info::{
    ModuleInfo, ModuleInfoHook, ModuleLifecycleHook, ON_MODULE_INFO, ON_MODULE_LOAD,
    ON_MODULE_UNLOAD,
};
pub use loader::DynamicLoader;
