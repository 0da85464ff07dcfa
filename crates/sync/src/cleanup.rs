//! Removal of previously installed output.
//!
//! Only entries carrying the ownership marker are ever touched: a `beat-`
//! name prefix under [`CleanupPolicy::PrefixMatch`], or the owned `beat/`
//! directory under [`CleanupPolicy::OwnedSubdirectory`].

use crate::adapters::CleanupPolicy;
use crate::error::InstallError;
use std::fs;
use std::path::{Path, PathBuf};

fn is_owned(name: &str, marker: &str, policy: CleanupPolicy) -> bool {
    match policy {
        CleanupPolicy::PrefixMatch => name
            .strip_prefix(marker)
            .is_some_and(|rest| rest.starts_with('-')),
        CleanupPolicy::OwnedSubdirectory => name == marker,
    }
}

/// Lists the entries directly under `root` that `cleanup` would remove,
/// sorted by path. A missing root has none.
pub fn cleanup_candidates(
    root: &Path,
    marker: &str,
    policy: CleanupPolicy,
) -> Result<Vec<PathBuf>, InstallError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let read_err = |source| InstallError::Read {
        path: root.to_path_buf(),
        source,
    };
    let mut out = Vec::new();
    for entry in fs::read_dir(root).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let name = entry.file_name();
        if is_owned(&name.to_string_lossy(), marker, policy) {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}

fn remove_entry(path: &Path) -> Result<(), InstallError> {
    let delete_err = |source| InstallError::Delete {
        path: path.to_path_buf(),
        source,
    };
    // symlink_metadata so a linked directory is unlinked, not emptied.
    let meta = fs::symlink_metadata(path).map_err(delete_err)?;
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(delete_err)
    } else {
        fs::remove_file(path).map_err(delete_err)
    }
}

/// Removes owned entries directly under `root`; returns how many were removed.
///
/// The first failed delete aborts and is returned; entries removed before it
/// stay removed.
pub fn cleanup(root: &Path, marker: &str, policy: CleanupPolicy) -> Result<usize, InstallError> {
    let candidates = cleanup_candidates(root, marker, policy)?;
    for path in &candidates {
        remove_entry(path)?;
        tracing::debug!(path = %path.display(), %policy, "Removed previous install");
    }
    Ok(candidates.len())
}
