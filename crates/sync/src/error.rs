//! Typed failures of a single target's install.

use std::path::PathBuf;

/// Errors that abort one target's install. Sibling targets are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// A destination directory could not be listed.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A rendered file or its parent directory could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A previously installed entry could not be removed.
    #[error("failed to remove {}: {source}", .path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Two artifacts rendered to the same destination.
    #[error("{first} and {second} both render to {}", .path.display())]
    PathCollision {
        path: PathBuf,
        first: String,
        second: String,
    },
}
