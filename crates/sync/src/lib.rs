//! Per-target rendering and installation for beat.
//!
//! Every supported integration is described by a [`RenderTarget`] record;
//! one generic [`render`] turns a collected artifact into the file that
//! target expects, and the [`Installer`] replaces this tool's previous
//! output under each target root without touching anything it does not own.
//!
//! # Examples
//!
//! ```
//! use beat_discovery::{ArtifactKind, ArtifactRecord};
//! use beat_sync::{find_target, render};
//! use std::path::PathBuf;
//!
//! let agent = ArtifactRecord {
//!     module: "core".into(),
//!     kind: ArtifactKind::Agent,
//!     name: "dev".into(),
//!     source_path: PathBuf::from("core/agents/dev.md"),
//!     raw_content: "<agent id=\"dev\" title=\"Developer\">\n</agent>\n".into(),
//!     hash: String::new(),
//! };
//!
//! let gemini = find_target("gemini").unwrap();
//! let file = render(&agent, &gemini);
//! assert_eq!(
//!     file.destination_path,
//!     PathBuf::from(".gemini/commands/beat-core-agent-dev.toml")
//! );
//! assert!(file.content.starts_with("description = \"Developer\""));
//! ```

#![deny(unsafe_code)]

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub mod adapters;
pub mod cleanup;
pub mod error;
pub mod orchestrator;
pub mod render;
pub mod report;

pub use adapters::{
    all_targets, find_target, target_names, CleanupPolicy, EnvelopeFormat, NamingStrategy,
    RenderTarget, OWNERSHIP_MARKER,
};
pub use cleanup::{cleanup, cleanup_candidates};
pub use error::InstallError;
pub use orchestrator::{uninstall, InstallParams, Installer};
pub use render::{
    apply_envelope, destination_path, extract_title, render, split_frontmatter,
    strip_frontmatter, RenderedFile,
};
pub use report::{InstallReport, TargetOutcome, TargetReport};
