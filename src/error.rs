//! Crate-wide error type
//!
//! One tagged enum covers every failure the library can produce, with the
//! triggering context (index, path, symbol) carried as structured fields
//! rather than pre-rendered text.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure kinds of the extension and module layers.
///
/// Note the deliberate absence of an "already unloaded" kind: unloading a
/// library that is not loaded is a successful no-op.
#[derive(Error, Debug)]
pub enum Error {
    /// Dereference of a back-reference that is empty or whose target has
    /// been dropped.
    #[error("reference is not engaged")]
    EmptyReference,

    /// Indexed access past the end of a collection.
    #[error("index out of range (index: {index}, len: {len})")]
    OutOfRange { index: usize, len: usize },

    /// Dereference of a slot that is present but holds no value.
    #[error("no value assigned (index: {index})")]
    EmptySlot { index: usize },

    /// The current process may not read the library file.
    #[error("no read access (path: {})", path.display())]
    NotReadable { path: PathBuf },

    /// The path does not carry the platform dynamic-library extension.
    #[error("invalid extension (path: {}, expected: .{expected})", path.display())]
    InvalidExtension {
        path: PathBuf,
        expected: &'static str,
    },

    /// `load()` on a handle that is already loaded.
    #[error("already loaded (path: {})", path.display())]
    AlreadyLoaded { path: PathBuf },

    /// The platform loader rejected the library; `message` is its last-error
    /// text (`dlerror` / `GetLastError`).
    #[error("failed to load dynamic library (path: {}): {message}", path.display())]
    LoadFailed { path: PathBuf, message: String },

    /// The platform failed to release the library handle.
    #[error("failed to unload dynamic library (path: {}): {message}", path.display())]
    UnloadFailed { path: PathBuf, message: String },

    /// Symbol access through a handle that is not loaded.
    #[error("failed to get symbol, dynamic library is not loaded (symbol: {symbol}, path: {})", path.display())]
    NotLoaded { symbol: String, path: PathBuf },

    /// The loaded library exports no symbol under the requested name.
    #[error("no function from dynamic library (function: {symbol}, path: {})", path.display())]
    SymbolNotFound { symbol: String, path: PathBuf },

    /// A hook invocation panicked; the unwind was caught at the host
    /// boundary.
    #[error("hook panicked (function: {symbol}, path: {})", path.display())]
    HookPanic { symbol: String, path: PathBuf },

    /// Filesystem failure outside the lifecycle state machine (discovery,
    /// config reads).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Wraps an I/O error with a human-readable context line.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let e = Error::OutOfRange { index: 7, len: 3 };
        assert_eq!(e.to_string(), "index out of range (index: 7, len: 3)");

        let e = Error::SymbolNotFound {
            symbol: "on_module_info".into(),
            path: PathBuf::from("/opt/app/modules/foo.so"),
        };
        assert!(e.to_string().contains("on_module_info"));
        assert!(e.to_string().contains("/opt/app/modules/foo.so"));
    }

    #[test]
    fn test_io_wrapper_keeps_source() {
        let inner = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let e = Error::io("reading module directory", inner);
        assert!(e.to_string().starts_with("reading module directory"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
