use crate::types::ArtifactKind;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Manifest location relative to the content root.
pub const DEFAULT_MANIFEST_PATH: &str = "_config/manifest.yaml";

/// One task or tool listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Owning module.
    pub module: String,
    /// Artifact name (file stem).
    pub name: String,
    /// Whether the entry is exposed to editors on its own.
    #[serde(default = "default_true")]
    pub standalone: bool,
}

fn default_true() -> bool {
    true
}

/// Parsed task/tool manifest.
///
/// ```yaml
/// tasks:
///   - { module: core, name: index-docs, standalone: true }
///   - { module: core, name: shard-doc, standalone: false }
/// tools: []
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Task entries.
    #[serde(default)]
    pub tasks: Vec<ManifestEntry>,
    /// Tool entries.
    #[serde(default)]
    pub tools: Vec<ManifestEntry>,
}

impl Manifest {
    /// Entries that apply to `kind`; agents and workflows are never listed.
    pub fn entries(&self, kind: ArtifactKind) -> &[ManifestEntry] {
        match kind {
            ArtifactKind::Task => &self.tasks,
            ArtifactKind::Tool => &self.tools,
            ArtifactKind::Agent | ArtifactKind::Workflow => &[],
        }
    }

    /// True when the manifest lists the artifact with `standalone: false`.
    ///
    /// Unlisted artifacts are kept.
    pub fn excludes(&self, module: &str, kind: ArtifactKind, name: &str) -> bool {
        self.entries(kind)
            .iter()
            .any(|e| e.module == module && e.name == name && !e.standalone)
    }
}

/// Parses manifest YAML. An empty document is an empty manifest.
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    if text.trim().is_empty() {
        return Ok(Manifest::default());
    }
    serde_yaml::from_str(text).map_err(|e| anyhow::anyhow!("Invalid manifest YAML: {e}"))
}

/// Loads the manifest at `path`; `None` when the file does not exist.
pub fn load_manifest(path: &Path) -> Result<Option<Manifest>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let manifest =
        parse_manifest(&text).with_context(|| format!("In manifest {}", path.display()))?;
    Ok(Some(manifest))
}
