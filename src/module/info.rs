//! Module metadata and the exported hook contract
//!
//! A loadable module publishes who it is through one required export and
//! participates in lifecycle notifications through two optional ones. The
//! contract is a naming convention, not compiler-checked: the host resolves
//! the exports by name and asserts their signatures. Modules are expected to
//! be built with the same toolchain as the host; the metadata export returns
//! a reference to a module-owned `static`, so no ownership crosses the
//! boundary and the host clones whatever it keeps.
//!
//! # Example (module side)
//!
//! ```ignore
//! use std::sync::LazyLock;
//! use modhost::ModuleInfo;
//!
//! static INFO: LazyLock<ModuleInfo> = LazyLock::new(|| {
//!     ModuleInfo::new("commons", "relay", "0.3.1", "Relay transport module")
//! });
//!
//! #[no_mangle]
//! pub fn on_module_info() -> &'static ModuleInfo {
//!     &INFO
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::module::dynamic::DynamicModule;

/// Immutable metadata a module publishes about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Module author or vendor.
    pub author: String,
    /// Declared module name; composed into diagnostics and class names.
    pub name: String,
    /// Module version string.
    pub version: String,
    /// One-line description.
    pub description: String,
}

impl ModuleInfo {
    /// Convenience constructor for the four fields.
    pub fn new(
        author: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        ModuleInfo {
            author: author.into(),
            name: name.into(),
            version: version.into(),
            description: description.into(),
        }
    }
}

/// Name of the REQUIRED metadata export; absence is an error.
pub const ON_MODULE_INFO: &str = "on_module_info";

/// Name of the OPTIONAL post-load hook; absence is not an error.
pub const ON_MODULE_LOAD: &str = "on_module_load";

/// Name of the OPTIONAL pre-unload hook; absence is not an error.
pub const ON_MODULE_UNLOAD: &str = "on_module_unload";

/// Signature of [`ON_MODULE_INFO`].
pub type ModuleInfoHook = fn() -> &'static ModuleInfo;

/// Signature of [`ON_MODULE_LOAD`] and [`ON_MODULE_UNLOAD`]; the hook
/// receives the host-side module it belongs to.
pub type ModuleLifecycleHook = fn(&mut DynamicModule);
