//! Module trees: a module that owns and sequences child modules
//!
//! [`DynamicLoader`] is itself a [`Module`] wrapped around an
//! [`ExtensionStack`] of children, so trees compose: a child may be another
//! loader. Loading is self-first, then children in insertion order; unloading
//! is children in reverse insertion order, then self. A child failure stops
//! the sweep and propagates; nothing already transitioned is rolled back, so
//! the caller decides whether to retry, unload, or drop.

use std::any::Any;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::backref::BackRef;
use crate::collection::ExtensionStack;
use crate::error::Result;
use crate::extension::{Extension, OwnerId, OwnerRef};
use crate::module::discovery::discover_modules;
use crate::module::dynamic::{DynamicModule, Module};
use crate::module::info::ModuleInfo;
use crate::utils::visit_filtered;

impl ExtensionStack<dyn Module> {
    /// Constructs a module in place and appends it, unloaded.
    ///
    /// `build` receives a back-reference to this stack's identity so the
    /// module's owner is fixed at construction. Returns a typed reference to
    /// the freshly inserted module.
    pub fn attach<C, F>(&mut self, build: F) -> &mut C
    where
        C: Module,
        F: FnOnce(BackRef<OwnerId>) -> C,
    {
        let module = build(self.owner_ref());
        self.push_boxed(Box::new(module));
        self.newest_as::<C>()
    }
}

/// A module that owns child modules and drives their lifecycles.
///
/// The child stack is declared before the loader's own module, so when a
/// loader is dropped the children are destroyed first, newest first, and the
/// loader's library goes last.
pub struct DynamicLoader<M: Module = DynamicModule> {
    modules: ExtensionStack<dyn Module>,
    module: M,
}

impl DynamicLoader<DynamicModule> {
    /// Creates a loader around an unloaded [`DynamicModule`] for `path`.
    ///
    /// The loader itself has no owner; it is the root of its tree.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_module(DynamicModule::detached(path))
    }
}

impl<M: Module> DynamicLoader<M> {
    /// Wraps an existing module as the loader's own identity.
    pub fn from_module(module: M) -> Self {
        DynamicLoader {
            modules: ExtensionStack::new(format!("loader:{}", module.classname())),
            module,
        }
    }

    /// The loader's own module.
    pub fn module(&self) -> &M {
        &self.module
    }

    /// Mutable access to the loader's own module.
    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    /// The child modules, in insertion order.
    pub fn modules(&self) -> &ExtensionStack<dyn Module> {
        &self.modules
    }

    /// Mutable access to the child modules.
    pub fn modules_mut(&mut self) -> &mut ExtensionStack<dyn Module> {
        &mut self.modules
    }

    /// Constructs a child module and appends it without loading it.
    ///
    /// The child participates in the next [`Module::load`] sweep; nothing
    /// happens at attach time.
    pub fn attach_module<C, F>(&mut self, build: F) -> &mut C
    where
        C: Module,
        F: FnOnce(BackRef<OwnerId>) -> C,
    {
        self.modules.attach(build)
    }

    /// Attaches one unloaded [`DynamicModule`] per platform library found in
    /// `dir`, in discovery order. Returns how many were attached.
    pub fn attach_discovered(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let paths = discover_modules(dir.as_ref())?;
        let count = paths.len();
        for path in paths {
            self.modules.attach(|owner| DynamicModule::new(owner, path));
        }
        debug!("Attached {} discovered modules", count);
        Ok(count)
    }

    /// Loads every unloaded child in insertion order. Stops at the first
    /// failure and propagates it; children loaded so far stay loaded.
    fn load_modules(&mut self) -> Result<()> {
        let failure = visit_filtered(
            self.modules.iter_mut(),
            |slot| slot.as_ref().is_some_and(|module| module.is_unloaded()),
            |slot| match slot.as_deref_mut() {
                Some(module) => match module.load() {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(e) => {
                        warn!("Child module failed to load: {}", e);
                        ControlFlow::Break(e)
                    }
                },
                None => ControlFlow::Continue(()),
            },
        );
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Unloads every loaded child in reverse insertion order. Stops at the
    /// first failure and propagates it.
    fn unload_modules(&mut self) -> Result<()> {
        let failure = visit_filtered(
            self.modules.iter_mut().rev(),
            |slot| slot.as_ref().is_some_and(|module| module.is_loaded()),
            |slot| match slot.as_deref_mut() {
                Some(module) => match module.unload() {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(e) => {
                        warn!("Error unloading child module: {}", e);
                        ControlFlow::Break(e)
                    }
                },
                None => ControlFlow::Continue(()),
            },
        );
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<M: Module> Extension for DynamicLoader<M> {
    fn owner(&self) -> &OwnerRef {
        self.module.owner()
    }

    fn classname(&self) -> String {
        let base = std::any::type_name::<Self>();
        match self.module.info() {
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

impl<M: Module> Module for DynamicLoader<M> {
    /// Loads the loader's own module first, then the children in insertion
    /// order.
    fn load(&mut self) -> Result<()> {
        self.module.load()?;
        self.load_modules()?;
        info!("Module tree loaded: {} child slots", self.modules.len());
        Ok(())
    }

    /// Unloads the children in reverse insertion order, then the loader's
    /// own module.
    fn unload(&mut self) -> Result<()> {
        self.unload_modules()?;
        self.module.unload()
    }

    fn is_loaded(&self) -> bool {
        self.module.is_loaded()
    }

    fn info(&self) -> Result<ModuleInfo> {
        self.module.info()
    }
}
