//! Store path validation
//!
//! Runs once when a store is opened. The candidate filename is resolved
//! lexically against an explicit root; nothing on disk is consulted, so
//! the file (and its parent directories) need not exist yet.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use super::errors::{StoreError, StoreResult};

/// Resolve `filename` under `root`, rejecting anything that escapes it.
///
/// # Errors
///
/// - `PathTraversal` if the resolved path is not inside `root`
/// - `InvalidFilename` if the path has no file name or the name contains NUL
pub fn resolve_store_path(root: &Path, filename: &str) -> StoreResult<PathBuf> {
    let root = normalize(root);
    let candidate = normalize(&root.join(filename));

    if !candidate.starts_with(&root) {
        return Err(StoreError::PathTraversal(filename.to_string()));
    }

    if candidate == root {
        return Err(StoreError::InvalidFilename(filename.replace('\0', "\\0")));
    }

    match candidate.file_name() {
        Some(name) if !contains_nul(name) => Ok(candidate),
        _ => Err(StoreError::InvalidFilename(filename.replace('\0', "\\0"))),
    }
}

/// Collapse `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component.as_os_str())
            }
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the filesystem root stays at the root
                if !out.pop() && !out.has_root() {
                    out.push(component.as_os_str());
                }
            }
        }
    }
    out
}

fn contains_nul(name: &OsStr) -> bool {
    name.to_string_lossy().contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/app")
    }

    #[test]
    fn test_simple_filename() {
        let path = resolve_store_path(&root(), "db.json").unwrap();
        assert_eq!(path, PathBuf::from("/srv/app/db.json"));
    }

    #[test]
    fn test_nested_filename() {
        let path = resolve_store_path(&root(), "./data/../data/db.json").unwrap();
        assert_eq!(path, PathBuf::from("/srv/app/data/db.json"));
    }

    #[test]
    fn test_parent_escape_rejected() {
        let err = resolve_store_path(&root(), "../secret.json").unwrap_err();
        assert_eq!(err, StoreError::PathTraversal("../secret.json".into()));
    }

    #[test]
    fn test_deep_escape_rejected() {
        let err = resolve_store_path(&root(), "data/../../../etc/passwd").unwrap_err();
        assert!(matches!(err, StoreError::PathTraversal(_)));
    }

    #[test]
    fn test_absolute_outside_rejected() {
        let err = resolve_store_path(&root(), "/etc/passwd").unwrap_err();
        assert!(matches!(err, StoreError::PathTraversal(_)));
    }

    #[test]
    fn test_absolute_inside_accepted() {
        let path = resolve_store_path(&root(), "/srv/app/db.json").unwrap();
        assert_eq!(path, PathBuf::from("/srv/app/db.json"));
    }

    #[test]
    fn test_sibling_prefix_rejected() {
        // "/srv/application" shares a string prefix with the root but not a component prefix
        let err = resolve_store_path(&root(), "../application/db.json").unwrap_err();
        assert!(matches!(err, StoreError::PathTraversal(_)));
    }

    #[test]
    fn test_nul_byte_rejected() {
        let err = resolve_store_path(&root(), "db\0.json").unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilename(_)));
        assert!(!err.to_string().contains('\0'));
    }

    #[test]
    fn test_root_itself_rejected() {
        let err = resolve_store_path(&root(), ".").unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilename(_)));
    }
}
