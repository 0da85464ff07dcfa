use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Module every installation must provide.
pub const CORE_MODULE: &str = "core";

/// Pseudo-module assigned to agents found in the standalone `agents/` area.
pub const STANDALONE_MODULE: &str = "standalone";

/// The kind of definition an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Persona definition (`agents/`).
    Agent,
    /// Executable task (`tasks/`).
    Task,
    /// Tool description (`tools/`).
    Tool,
    /// Multi-step workflow (`workflows/`).
    Workflow,
}

impl ArtifactKind {
    /// All kinds, in collection order.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Agent,
        ArtifactKind::Task,
        ArtifactKind::Tool,
        ArtifactKind::Workflow,
    ];

    /// Returns the singular label used in destination names (`agent`).
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Agent => "agent",
            ArtifactKind::Task => "task",
            ArtifactKind::Tool => "tool",
            ArtifactKind::Workflow => "workflow",
        }
    }

    /// Returns the directory name the kind lives under (`agents`).
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArtifactKind::Agent => "agents",
            ArtifactKind::Task => "tasks",
            ArtifactKind::Tool => "tools",
            ArtifactKind::Workflow => "workflows",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses a kind from its singular or plural name.
///
/// ```
/// use beat_discovery::{parse_kind_key, ArtifactKind};
///
/// assert_eq!(parse_kind_key("agents"), Some(ArtifactKind::Agent));
/// assert_eq!(parse_kind_key("Task"), Some(ArtifactKind::Task));
/// assert_eq!(parse_kind_key("skill"), None);
/// ```
pub fn parse_kind_key(key: &str) -> Option<ArtifactKind> {
    ArtifactKind::ALL.into_iter().find(|kind| {
        key.eq_ignore_ascii_case(kind.label()) || key.eq_ignore_ascii_case(kind.dir_name())
    })
}

/// A single collected definition file.
///
/// Identity is `(module, kind, name)`; records are immutable once collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Owning module (`core`, a feature module, or `standalone`).
    pub module: String,
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// Sanitized artifact name (`[A-Za-z0-9_-]+`).
    pub name: String,
    /// File the artifact was read from.
    pub source_path: PathBuf,
    /// Unmodified file content.
    pub raw_content: String,
    /// SHA-256 of the content (hex).
    pub hash: String,
}

impl ArtifactRecord {
    /// Returns the identity triple.
    pub fn identity(&self) -> (&str, ArtifactKind, &str) {
        (&self.module, self.kind, &self.name)
    }

    /// Returns `module/kind/name`, used in logs and listings.
    pub fn id(&self) -> String {
        format!("{}/{}/{}", self.module, self.kind, self.name)
    }
}

/// A candidate that was dropped because its identity was already collected.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateInfo {
    /// Module the skipped file belonged to.
    pub module: String,
    /// Kind of the skipped file.
    pub kind: ArtifactKind,
    /// Artifact name shared by both files.
    pub name: String,
    /// File that was skipped.
    pub skipped_path: PathBuf,
    /// File that was kept.
    pub kept_path: PathBuf,
}

/// Failures while collecting artifacts.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The content root or its `core` module is missing; nothing can be installed.
    #[error("missing installation at {}: {reason}", .path.display())]
    MissingInstallation {
        /// Path that was expected to exist.
        path: PathBuf,
        /// What was missing.
        reason: &'static str,
    },
    /// A selected module name cannot be used in destination names.
    #[error("invalid module name '{name}': use letters, digits and '_' only (and not 'standalone')")]
    InvalidModule {
        /// The rejected name.
        name: String,
    },
    /// A candidate file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
