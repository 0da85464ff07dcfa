//! Configuration record describing one target's file-layout convention.

use beat_discovery::ArtifactKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Marks everything this tool writes: flat files are prefixed `beat-`, nested
/// output lives under an owned `beat/` directory.
pub const OWNERSHIP_MARKER: &str = "beat";

/// How destination paths are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// `{root}/beat-{module}-{kind}-{name}.{ext}`
    Flat,
    /// `{root}/beat/{module}/{kinds}/{name}.{ext}`
    Nested,
}

/// Metadata wrapper placed around an artifact body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeFormat {
    /// Raw content, unchanged.
    None,
    /// YAML frontmatter block.
    Frontmatter,
    /// Cursor rule frontmatter (`description`, `globs`, `alwaysApply`).
    Mdc,
    /// `description` + multi-line `prompt` TOML table.
    Toml,
    /// Plain markdown `# Title` heading.
    Header,
}

/// Which previously written entries are removed before a target is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CleanupPolicy {
    /// Every entry directly under the root whose name starts with `beat-`.
    PrefixMatch,
    /// The owned `beat/` directory under the root.
    OwnedSubdirectory,
}

impl fmt::Display for CleanupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupPolicy::PrefixMatch => f.write_str("prefix-match"),
            CleanupPolicy::OwnedSubdirectory => f.write_str("owned-subdirectory"),
        }
    }
}

/// One integration's conventions.
///
/// This is plain data; [`crate::render::render`] interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderTarget {
    /// Selection key (`claude-code`, `gemini`, ...).
    pub name: String,
    /// Name shown to users.
    pub display_name: String,
    /// Destination root, relative to the project directory unless absolute.
    pub root: PathBuf,
    pub naming: NamingStrategy,
    pub envelope: EnvelopeFormat,
    /// File extension without the leading dot; may be compound (`chatmode.md`).
    pub extension: String,
    pub cleanup: CleanupPolicy,
    /// Kinds the target receives.
    pub kinds: Vec<ArtifactKind>,
}

impl RenderTarget {
    /// Replaces the destination root (e.g. from a per-target config override).
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// True when artifacts of `kind` are installed for this target.
    pub fn accepts(&self, kind: ArtifactKind) -> bool {
        self.kinds.contains(&kind)
    }
}
