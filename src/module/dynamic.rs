//! Dynamically loaded modules
//!
//! [`DynamicModule`] pairs a [`DynamicLibrary`] with an extension identity
//! and drives the exported hook contract from [`crate::module::info`]:
//! loading maps the library and then invokes the optional `on_module_load`
//! hook, unloading invokes the optional `on_module_unload` hook and then
//! unmaps. Metadata comes from the required `on_module_info` export, so
//! [`Module::info`] fails on a module that does not publish it.
//!
//! Lifecycle hooks are best-effort: a missing hook is logged and skipped,
//! and a panicking hook is caught and logged so the module's own state
//! transition still completes.

use std::any::Any;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::backref::BackRef;
use crate::config::load_module_config;
use crate::error::Result;
use crate::extension::{Extension, OwnerId, OwnerRef};
use crate::library::DynamicLibrary;
use crate::module::info::{
    ModuleInfo, ModuleInfoHook, ModuleLifecycleHook, ON_MODULE_INFO, ON_MODULE_LOAD,
    ON_MODULE_UNLOAD,
};

/// Lifecycle interface shared by leaf modules and module trees.
///
/// `load` and `unload` move between exactly two states; [`Module::is_loaded`]
/// and [`Module::is_unloaded`] are complementary at all times. Metadata is
/// mandatory, so [`Module::info`] returns a `Result` rather than an `Option`.
pub trait Module: Extension + 'static {
    /// Brings the module into the loaded state.
    fn load(&mut self) -> Result<()>;

    /// Returns the module to the unloaded state. Unloading a module that is
    /// already unloaded succeeds without doing anything.
    fn unload(&mut self) -> Result<()>;

    /// True while the module's library is mapped.
    fn is_loaded(&self) -> bool;

    /// Complement of [`Module::is_loaded`].
    fn is_unloaded(&self) -> bool {
        !self.is_loaded()
    }

    /// Metadata the module publishes about itself.
    fn info(&self) -> Result<ModuleInfo>;
}

/// A module backed by a dynamic library on disk.
#[derive(Debug)]
pub struct DynamicModule {
    owner: OwnerRef,
    library: DynamicLibrary,
}

impl DynamicModule {
    /// Creates an unloaded module owned by whoever `owner` points back to.
    ///
    /// No I/O happens here; the path is validated when [`Module::load`]
    /// runs.
    pub fn new(owner: BackRef<OwnerId>, path: impl Into<PathBuf>) -> Self {
        DynamicModule {
            owner: OwnerRef::new(owner),
            library: DynamicLibrary::new(path),
        }
    }

    /// Creates an unloaded module with no owner, for standalone use outside
    /// any loader.
    pub fn detached(path: impl Into<PathBuf>) -> Self {
        DynamicModule {
            owner: OwnerRef::detached(),
            library: DynamicLibrary::new(path),
        }
    }

    /// Path of the backing library.
    pub fn path(&self) -> &Path {
        self.library.path()
    }

    /// The backing library handle.
    pub fn library(&self) -> &DynamicLibrary {
        &self.library
    }

    /// Mutable access to the backing library handle.
    pub fn library_mut(&mut self) -> &mut DynamicLibrary {
        &mut self.library
    }

    /// Directory containing the module's library.
    ///
    /// Empty for a bare relative path like `module.so`.
    pub fn root_path(&self) -> PathBuf {
        self.library
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Configuration directory for this module: the `config` directory next
    /// to the module root. A layout like `/opt/app/modules/relay.so` resolves
    /// to `/opt/app/config`.
    pub fn config_dir(&self) -> PathBuf {
        match self.root_path().parent() {
            Some(parent) => parent.join("config"),
            None => PathBuf::from("config"),
        }
    }

    /// Configuration file for this module: `<config_dir>/<library stem>.toml`.
    pub fn config_file(&self) -> PathBuf {
        let stem = self
            .library
            .path()
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("module");
        self.config_dir().join(format!("{stem}.toml"))
    }

    /// Loads the module's configuration file into flat key/value pairs.
    ///
    /// A missing file yields an empty map; see
    /// [`crate::config::load_module_config`].
    pub fn config(&self) -> Result<HashMap<String, String>> {
        load_module_config(self.config_file())
    }

    /// Resolves and invokes an optional lifecycle hook.
    ///
    /// Missing hooks (or an unloaded library) are skipped at debug level.
    /// A panic inside the hook is caught and logged; the lifecycle
    /// transition that triggered the hook still completes.
    fn invoke_lifecycle_hook(&mut self, name: &str) {
        // Copy the function pointer out first so the library borrow is
        // released before the hook borrows the whole module.
        //
        // SAFETY: lifecycle hooks have this exact signature by the exported
        // module contract; a mismatched export is the module's bug.
        let hook = unsafe { self.library.symbol::<ModuleLifecycleHook>(name) }.map(|s| *s);
        match hook {
            Ok(hook) => {
                debug!("Invoking module hook {} for {}", name, self.path().display());
                if panic::catch_unwind(AssertUnwindSafe(|| hook(&mut *self))).is_err() {
                    warn!("Module hook {} panicked for {}", name, self.path().display());
                }
            }
            Err(e) => {
                debug!("Skipping module hook {}: {}", name, e);
            }
        }
    }
}

impl Extension for DynamicModule {
    fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    fn classname(&self) -> String {
        let base = std::any::type_name::<Self>();
        match self.info() {
            Ok(info) => format!("{}::{}", base, info.name),
            Err(_) => base.to_string(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Module for DynamicModule {
    fn load(&mut self) -> Result<()> {
        info!("Loading module: {}", self.path().display());
        self.library.load()?;
        self.invoke_lifecycle_hook(ON_MODULE_LOAD);
        info!("Module {} loaded successfully", self.path().display());
        Ok(())
    }

    fn unload(&mut self) -> Result<()> {
        if self.is_loaded() {
            info!("Unloading module: {}", self.path().display());
            self.invoke_lifecycle_hook(ON_MODULE_UNLOAD);
        }
        self.library.unload()
    }

    fn is_loaded(&self) -> bool {
        self.library.is_loaded()
    }

    fn info(&self) -> Result<ModuleInfo> {
        // SAFETY: the metadata export has this exact signature by the
        // exported module contract. The returned reference points into the
        // mapped library, so it is cloned before the borrow ends.
        let hook = unsafe { self.library.symbol::<ModuleInfoHook>(ON_MODULE_INFO) }.map(|s| *s)?;
        Ok(hook().clone())
    }
}
