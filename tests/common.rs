use std::env::consts::DLL_EXTENSION;
use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Real shared libraries worth probing on a test host, in preference order.
/// Library tests borrow one of these instead of shipping a compiled fixture.
pub const SYSTEM_LIBRARIES: &[&str] = &[
    "/lib/x86_64-linux-gnu/libm.so.6",
    "/usr/lib/x86_64-linux-gnu/libm.so.6",
    "/lib/aarch64-linux-gnu/libm.so.6",
    "/usr/lib/aarch64-linux-gnu/libm.so.6",
    "/lib64/libm.so.6",
    "/usr/lib64/libm.so.6",
    "/usr/lib/libm.so.6",
];

/// Finds a real shared library on the test host, if there is one. Tests that
/// need to map actual code skip themselves when this returns `None`.
pub fn system_library() -> Option<PathBuf> {
    SYSTEM_LIBRARIES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// A temporary module layout: `<root>/modules/` holding libraries and
/// `<root>/config/` next to it, matching how modules resolve their
/// configuration directory.
pub struct ModuleFixture {
    pub root: TempDir,
}

impl ModuleFixture {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let root = TempDir::new()?;
        fs::create_dir(root.path().join("modules"))?;
        fs::create_dir(root.path().join("config"))?;
        Ok(ModuleFixture { root })
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.root.path().join("modules")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.path().join("config")
    }

    /// Symlinks a real system library into `modules/` under a module name
    /// with the platform library extension. Returns `None` when the host has
    /// no library to borrow.
    pub fn link_system_library(&self, name: &str) -> Option<PathBuf> {
        let target = system_library()?;
        let link = self.modules_dir().join(format!("{name}.{DLL_EXTENSION}"));
        std::os::unix::fs::symlink(target, &link).ok()?;
        Some(link)
    }

    /// Writes a file that carries the library extension but is not loadable.
    pub fn write_garbage_library(&self, name: &str) -> PathBuf {
        let path = self.modules_dir().join(format!("{name}.{DLL_EXTENSION}"));
        fs::write(&path, b"this is not an object file").unwrap();
        path
    }

    /// Writes `config/<name>.toml` with the given contents.
    pub fn write_config(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.config_dir().join(format!("{name}.toml"));
        fs::write(&path, contents).unwrap();
        path
    }
}
