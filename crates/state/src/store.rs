//! Per-target key/value configuration persisted as JSON.
//!
//! ```json
//! { "codex": { "enabled": "true", "root": "~/.codex/prompts" } }
//! ```

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key marking a target as selected for future installs.
pub const ENABLED_KEY: &str = "enabled";
/// Key overriding a target's destination root.
pub const ROOT_KEY: &str = "root";
/// Key narrowing the kinds a target receives (comma-separated).
pub const KINDS_KEY: &str = "kinds";

type TargetMap = BTreeMap<String, BTreeMap<String, String>>;

/// JSON-backed map of target name to string settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
    targets: TargetMap,
}

impl ConfigStore {
    /// Loads the store at `path`; a missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                targets: TargetMap::new(),
            });
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let targets: TargetMap = if data.trim().is_empty() {
            TargetMap::new()
        } else {
            serde_json::from_str(&data)
                .with_context(|| format!("invalid config {}", path.display()))?
        };
        tracing::debug!(path = %path.display(), targets = targets.len(), "Loaded config store");
        Ok(Self { path, targets })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, target: &str, key: &str) -> Option<&str> {
        self.targets
            .get(target)
            .and_then(|settings| settings.get(key))
            .map(String::as_str)
    }

    pub fn set(&mut self, target: &str, key: &str, value: impl Into<String>) {
        self.targets
            .entry(target.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Removes a key, dropping the target entry once it is empty.
    pub fn remove(&mut self, target: &str, key: &str) -> Option<String> {
        let settings = self.targets.get_mut(target)?;
        let previous = settings.remove(key);
        if settings.is_empty() {
            self.targets.remove(target);
        }
        previous
    }

    /// All settings of one target.
    pub fn target(&self, target: &str) -> Option<&BTreeMap<String, String>> {
        self.targets.get(target)
    }

    /// Target names with `enabled = true`, sorted.
    pub fn enabled_targets(&self) -> Vec<String> {
        self.targets
            .iter()
            .filter(|(_, settings)| {
                settings
                    .get(ENABLED_KEY)
                    .is_some_and(|v| v.eq_ignore_ascii_case("true"))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Pretty JSON of the whole store.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.targets)?)
    }

    /// Writes the store, replacing the previous file atomically.
    pub fn save(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(self.to_json()?.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to write config {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "Saved config store");
        Ok(())
    }
}
