//! Artifact collection for the beat installer.
//!
//! This crate provides mechanisms for:
//! - Scanning a content tree laid out as `{module}/{kind}/{name}.<ext>`.
//! - Filtering customization overrides and locally skipped artifacts.
//! - Reading the task/tool manifest that marks entries as standalone.
//!
//! # Examples
//!
//! ```
//! use beat_discovery::{collect, ArtifactKind};
//! use tempfile::tempdir;
//!
//! let temp = tempdir().unwrap();
//! let agents = temp.path().join("core/agents");
//! std::fs::create_dir_all(&agents).unwrap();
//! std::fs::write(agents.join("dev.md"), "# Developer").unwrap();
//!
//! let artifacts = collect(temp.path(), &[]).unwrap();
//! assert_eq!(artifacts.len(), 1);
//! assert_eq!(artifacts[0].kind, ArtifactKind::Agent);
//! assert_eq!(artifacts[0].module, "core");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Error type for discovery operations.
pub type Error = anyhow::Error;
/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Task/tool manifest reader.
pub mod manifest;
/// Content tree scanning.
pub mod scanner;
/// Artifact records, kinds and collection errors.
pub mod types;

pub use manifest::{load_manifest, parse_manifest, Manifest, ManifestEntry, DEFAULT_MANIFEST_PATH};
pub use scanner::{
    collect, collect_with, hash_content, is_local_skip, sanitize_name, validate_module_name,
    CollectOptions, CUSTOMIZE_MARKER,
};
pub use types::{
    parse_kind_key, ArtifactKind, ArtifactRecord, CollectError, DuplicateInfo, CORE_MODULE,
    STANDALONE_MODULE,
};
