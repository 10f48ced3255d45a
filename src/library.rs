//! Dynamic library handle with a strict load/unload state machine
//!
//! [`DynamicLibrary`] wraps one OS library handle (`dlopen` on Unix,
//! `LoadLibrary` on Windows, via `libloading`). A handle is constructed
//! unloaded and never touches the filesystem until [`DynamicLibrary::load`];
//! loading checks readability, the platform library extension, and the
//! current state before asking the platform loader, so every refusal carries
//! a precise reason instead of an opaque loader message.
//!
//! Typed symbol access trusts the caller-declared signature; no runtime
//! check is possible, which is why [`DynamicLibrary::symbol`],
//! [`DynamicLibrary::call`] and [`DynamicLibrary::try_call`] are `unsafe`.

use std::env::consts::DLL_EXTENSION;
use std::ffi::{c_void, OsStr};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::utils::fs;

/// One OS library handle, either unloaded (initial) or loaded.
#[derive(Debug)]
pub struct DynamicLibrary {
    path: PathBuf,
    library: Option<Library>,
}

impl DynamicLibrary {
    /// Binds a handle to `path` without touching the filesystem. The handle
    /// starts unloaded.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DynamicLibrary {
            path: path.into(),
            library: None,
        }
    }

    /// The path this handle is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True while the platform holds the library mapped for this handle.
    pub fn is_loaded(&self) -> bool {
        self.library.is_some()
    }

    /// Complement of [`DynamicLibrary::is_loaded`].
    pub fn is_unloaded(&self) -> bool {
        !self.is_loaded()
    }

    /// Loads the library through the platform loader (lazy binding).
    ///
    /// Preconditions, checked in order: the path must be readable by this
    /// process, must carry the platform library extension
    /// (`.so`/`.dylib`/`.dll`), and the handle must not already be loaded.
    /// A platform refusal surfaces as [`Error::LoadFailed`] carrying the
    /// loader's own message; the handle stays unloaded on every failure.
    pub fn load(&mut self) -> Result<()> {
        if !fs::is_readable(&self.path) {
            return Err(Error::NotReadable {
                path: self.path.clone(),
            });
        }
        if self.path.extension().and_then(OsStr::to_str) != Some(DLL_EXTENSION) {
            return Err(Error::InvalidExtension {
                path: self.path.clone(),
                expected: DLL_EXTENSION,
            });
        }
        if self.is_loaded() {
            return Err(Error::AlreadyLoaded {
                path: self.path.clone(),
            });
        }

        debug!("Loading dynamic library: {}", self.path.display());
        // SAFETY: loading executes the library's initialization routines;
        // the caller vouches for the file the handle was bound to.
        let library = unsafe { Library::new(&self.path) }.map_err(|e| Error::LoadFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        self.library = Some(library);
        info!("Loaded dynamic library: {}", self.path.display());
        Ok(())
    }

    /// Releases the library handle.
    ///
    /// Unloading a handle that is not loaded is a successful no-op. A
    /// platform failure surfaces as [`Error::UnloadFailed`]; the handle is
    /// considered detached afterwards either way.
    pub fn unload(&mut self) -> Result<()> {
        match self.library.take() {
            None => Ok(()),
            Some(library) => {
                library.close().map_err(|e| Error::UnloadFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                })?;
                info!("Unloaded dynamic library: {}", self.path.display());
                Ok(())
            }
        }
    }

    /// Raw symbol address; `None` when the symbol is absent or the library
    /// is not loaded. Never fails: the null sentinel is the whole contract.
    pub fn symbol_addr(&self, name: &str) -> Option<*mut c_void> {
        let library = self.library.as_ref()?;
        // SAFETY: resolving to an untyped address only; any use of the
        // address is on the caller.
        unsafe {
            library
                .get::<*mut c_void>(name.as_bytes())
                .map(|symbol| *symbol)
                .ok()
        }
    }

    /// Typed symbol resolution.
    ///
    /// The returned [`Symbol`] borrows this handle, so it cannot outlive the
    /// loaded library. Fails with [`Error::NotLoaded`] on an unloaded handle
    /// and [`Error::SymbolNotFound`] when the export is missing, naming the
    /// symbol and the path in both cases.
    ///
    /// # Safety
    ///
    /// The caller asserts that the export `name` has type `T`. A wrong
    /// signature is undefined behavior at the call site.
    pub unsafe fn symbol<T>(&self, name: &str) -> Result<Symbol<'_, T>> {
        let library = self.library.as_ref().ok_or_else(|| Error::NotLoaded {
            symbol: name.to_string(),
            path: self.path.clone(),
        })?;
        library.get(name.as_bytes()).map_err(|_| Error::SymbolNotFound {
            symbol: name.to_string(),
            path: self.path.clone(),
        })
    }

    /// Resolves `name` as a function of type `F` and hands the copied
    /// function pointer to `invoke`.
    ///
    /// Resolution failures propagate ([`Error::NotLoaded`],
    /// [`Error::SymbolNotFound`]); the invocation itself is not guarded.
    ///
    /// # Safety
    ///
    /// Same contract as [`DynamicLibrary::symbol`]: `F` must match the
    /// export's real signature.
    pub unsafe fn call<F, R>(&self, name: &str, invoke: impl FnOnce(F) -> R) -> Result<R>
    where
        F: Copy,
    {
        let function = *self.symbol::<F>(name)?;
        Ok(invoke(function))
    }

    /// As [`DynamicLibrary::call`], but failures never propagate. Every
    /// error (unresolved symbol, unloaded handle, or a panic escaping the
    /// invocation) is routed to `handler` and a default `R` is returned.
    ///
    /// This is the recovery point for optional hooks: absence of the export
    /// reaches the handler as [`Error::SymbolNotFound`] and the caller
    /// continues with the default value.
    ///
    /// # Safety
    ///
    /// Same signature contract as [`DynamicLibrary::symbol`].
    pub unsafe fn try_call<F, R>(
        &self,
        name: &str,
        handler: impl FnOnce(&Error),
        invoke: impl FnOnce(F) -> R,
    ) -> R
    where
        F: Copy,
        R: Default,
    {
        let function = match self.symbol::<F>(name) {
            Ok(symbol) => *symbol,
            Err(e) => {
                handler(&e);
                return R::default();
            }
        };
        match panic::catch_unwind(AssertUnwindSafe(|| invoke(function))) {
            Ok(result) => result,
            Err(_) => {
                handler(&Error::HookPanic {
                    symbol: name.to_string(),
                    path: self.path.clone(),
                });
                R::default()
            }
        }
    }
}

/// Teardown releases the handle; failures are reported, never propagated.
impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        if self.is_loaded() {
            if let Err(e) = self.unload() {
                warn!("Failed to unload dynamic library during drop: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs as stdfs;

    use super::*;

    fn library_name(stem: &str) -> String {
        format!("{stem}.{DLL_EXTENSION}")
    }

    #[test]
    fn test_fresh_handle_is_unloaded() {
        let library = DynamicLibrary::new("/opt/app/modules/foo.so");
        assert!(library.is_unloaded());
        assert!(!library.is_loaded());
        assert_eq!(library.path(), Path::new("/opt/app/modules/foo.so"));
    }

    #[test]
    fn test_load_missing_file_is_not_readable() {
        let mut library = DynamicLibrary::new("/no/such/place/mod.so");
        assert!(matches!(library.load(), Err(Error::NotReadable { .. })));
        assert!(library.is_unloaded());
    }

    #[test]
    fn test_load_rejects_foreign_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("module.txt");
        stdfs::write(&path, b"not a library").unwrap();

        let mut library = DynamicLibrary::new(&path);
        match library.load() {
            Err(Error::InvalidExtension { expected, .. }) => {
                assert_eq!(expected, DLL_EXTENSION);
            }
            other => panic!("expected InvalidExtension, got {other:?}"),
        }
        assert!(library.is_unloaded());
    }

    #[test]
    fn test_versioned_suffix_is_not_the_platform_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("libfake.{DLL_EXTENSION}.6"));
        stdfs::write(&path, b"elf? no").unwrap();

        let mut library = DynamicLibrary::new(&path);
        assert!(matches!(
            library.load(),
            Err(Error::InvalidExtension { .. })
        ));
    }

    #[test]
    fn test_load_garbage_surfaces_platform_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(library_name("garbage"));
        stdfs::write(&path, b"this is not an object file").unwrap();

        let mut library = DynamicLibrary::new(&path);
        match library.load() {
            Err(Error::LoadFailed { message, .. }) => {
                assert!(!message.is_empty());
            }
            other => panic!("expected LoadFailed, got {other:?}"),
        }
        assert!(library.is_unloaded());
    }

    #[cfg(unix)]
    #[test]
    fn test_load_write_only_file_is_not_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(library_name("hidden"));
        stdfs::write(&path, b"contents").unwrap();
        stdfs::set_permissions(&path, stdfs::Permissions::from_mode(0o200)).unwrap();

        let mut library = DynamicLibrary::new(&path);
        assert!(matches!(library.load(), Err(Error::NotReadable { .. })));
    }

    #[test]
    fn test_unload_when_unloaded_is_a_noop() {
        let mut library = DynamicLibrary::new("/opt/app/modules/foo.so");
        assert!(library.unload().is_ok());
        assert!(library.unload().is_ok());
        assert!(library.is_unloaded());
    }

    #[test]
    fn test_symbol_on_unloaded_handle_names_both() {
        let library = DynamicLibrary::new("/opt/app/modules/foo.so");
        // SAFETY: resolution fails before the signature could matter.
        let resolved = unsafe { library.symbol::<fn()>("on_module_info") };
        match resolved {
            Err(Error::NotLoaded { symbol, path }) => {
                assert_eq!(symbol, "on_module_info");
                assert_eq!(path, PathBuf::from("/opt/app/modules/foo.so"));
            }
            other => panic!("expected NotLoaded, got {other:?}"),
        }
    }

    #[test]
    fn test_symbol_addr_is_null_sentinel_when_unloaded() {
        let library = DynamicLibrary::new("/opt/app/modules/foo.so");
        assert!(library.symbol_addr("anything").is_none());
    }

    #[test]
    fn test_try_call_routes_not_loaded_to_handler() {
        let library = DynamicLibrary::new("/opt/app/modules/foo.so");
        let mut observed = None;
        // SAFETY: resolution fails before the signature could matter.
        let result: u32 = unsafe {
            library.try_call(
                "on_missing",
                |e| observed = Some(e.to_string()),
                |f: fn() -> u32| f(),
            )
        };
        assert_eq!(result, 0);
        let message = observed.expect("handler must run");
        assert!(message.contains("on_missing"));
    }
}
