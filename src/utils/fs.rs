//! Filesystem permission predicates
//!
//! Best-effort checks against the permission bits of a path. A path that
//! does not exist or cannot be inspected reports `false` for all three.
//! On Unix the checks mask the user/group/other permission bits; elsewhere
//! they fall back to what the platform metadata exposes.

use std::fs;
use std::path::Path;

#[cfg(unix)]
fn has_permission_bits(path: &Path, mask: u32) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(metadata) => metadata.permissions().mode() & mask != 0,
        Err(_) => false,
    }
}

/// True when any of the user/group/other read bits is set.
#[cfg(unix)]
pub fn is_readable(path: &Path) -> bool {
    has_permission_bits(path, 0o444)
}

/// True when any of the user/group/other write bits is set.
#[cfg(unix)]
pub fn is_writable(path: &Path) -> bool {
    has_permission_bits(path, 0o222)
}

/// True when any of the user/group/other execute bits is set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    has_permission_bits(path, 0o111)
}

/// True when the path exists and is statable.
#[cfg(not(unix))]
pub fn is_readable(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

/// True when the path exists and is not marked read-only.
#[cfg(not(unix))]
pub fn is_writable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => !metadata.permissions().readonly(),
        Err(_) => false,
    }
}

/// True when the path exists; execute semantics are not modeled off Unix.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}
