//! Module discovery
//!
//! Finds loadable module libraries on disk so a loader can attach them
//! without hard-coding paths.

use std::env::consts::DLL_EXTENSION;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Scans `dir` for platform dynamic libraries, non-recursively.
///
/// Only regular files carrying the platform library extension
/// ([`DLL_EXTENSION`]) are reported; anything else is ignored. Results are
/// sorted by path so discovery order is stable across platforms and
/// filesystems. A missing directory is created and yields an empty list, so
/// a fresh installation starts cleanly.
///
/// # Arguments
///
/// * `dir` - Directory to scan for module libraries
pub fn discover_modules(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        info!("Modules directory {} does not exist, creating it", dir.display());
        fs::create_dir_all(dir)
            .map_err(|e| Error::io(format!("creating modules directory {}", dir.display()), e))?;
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir)
        .map_err(|e| Error::io(format!("reading modules directory {}", dir.display()), e))?;

    let mut modules = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| Error::io(format!("reading modules directory {}", dir.display()), e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(OsStr::to_str) == Some(DLL_EXTENSION) {
            debug!("Discovered module library: {}", path.display());
            modules.push(path);
        }
    }

    modules.sort();
    info!("Discovered {} module libraries in {}", modules.len(), dir.display());
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_is_created_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let modules_dir = dir.path().join("modules");
        assert!(!modules_dir.exists());

        let found = discover_modules(&modules_dir).unwrap();
        assert!(found.is_empty());
        assert!(modules_dir.is_dir());
    }

    #[test]
    fn test_only_platform_libraries_are_reported_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta", "alpha", "mid"] {
            std::fs::write(
                dir.path().join(format!("{name}.{DLL_EXTENSION}")),
                b"stub",
            )
            .unwrap();
        }
        std::fs::write(dir.path().join("readme.md"), b"ignored").unwrap();
        std::fs::create_dir(dir.path().join(format!("nested.{DLL_EXTENSION}"))).unwrap();

        let found = discover_modules(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .filter_map(|p| p.file_name().and_then(OsStr::to_str))
            .collect();
        assert_eq!(
            names,
            vec![
                format!("alpha.{DLL_EXTENSION}"),
                format!("mid.{DLL_EXTENSION}"),
                format!("zeta.{DLL_EXTENSION}")
            ]
        );
    }

    #[test]
    fn test_versioned_suffixes_are_not_modules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(format!("lib.{DLL_EXTENSION}.6")), b"stub").unwrap();

        let found = discover_modules(dir.path()).unwrap();
        assert!(found.is_empty());
    }
}
