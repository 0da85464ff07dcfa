use crate::manifest::{load_manifest, Manifest, DEFAULT_MANIFEST_PATH};
use crate::types::{
    ArtifactKind, ArtifactRecord, CollectError, DuplicateInfo, CORE_MODULE, STANDALONE_MODULE,
};
use crate::Result;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File-name segment that marks a customization override (`dev.customize.yaml`).
pub const CUSTOMIZE_MARKER: &str = ".customize.";

/// Content markers that keep an artifact out of the local install.
const LOCAL_SKIP_MARKERS: [&str; 2] = ["localskip=\"true\"", "localskip: true"];

const ARTIFACT_EXTENSIONS: [&str; 4] = ["md", "xml", "yaml", "yml"];

/// Stem of the entry file for directory-style workflows (`workflows/x/workflow.yaml`).
const WORKFLOW_ENTRY_STEM: &str = "workflow";

/// Standalone agents live at `{content_root}/agents/{name}/*.md`.
const STANDALONE_DIR: &str = "agents";

/// Configuration for one collection pass.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Directory holding `core/`, feature modules and `agents/`.
    pub content_root: PathBuf,
    /// Modules to collect in addition to `core`, in order.
    pub modules: Vec<String>,
    /// Task/tool manifest; `None` excludes nothing.
    pub manifest: Option<Manifest>,
    /// Whether the standalone `agents/` area is scanned.
    pub include_standalone: bool,
}

impl CollectOptions {
    /// Options for `core` plus `modules`, without a manifest.
    pub fn new(content_root: impl Into<PathBuf>, modules: &[String]) -> Self {
        Self {
            content_root: content_root.into(),
            modules: modules.to_vec(),
            manifest: None,
            include_standalone: true,
        }
    }

    /// Sets the manifest.
    pub fn with_manifest(mut self, manifest: Option<Manifest>) -> Self {
        self.manifest = manifest;
        self
    }
}

/// Computes the SHA-256 of artifact content, returning a lowercase hex string.
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Sanitizes an artifact name so it is safe inside a destination file name.
/// Only allows alphanumeric characters, hyphens, and underscores.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Module names end up between hyphens in flat destination names, so they may
/// not contain one.
pub fn validate_module_name(name: &str) -> std::result::Result<(), CollectError> {
    let valid = !name.is_empty()
        && name != STANDALONE_MODULE
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CollectError::InvalidModule {
            name: name.to_string(),
        })
    }
}

/// True when the content asks to be left out of the local install.
pub fn is_local_skip(content: &str) -> bool {
    LOCAL_SKIP_MARKERS.iter().any(|m| content.contains(m))
}

fn has_artifact_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ARTIFACT_EXTENSIONS.contains(&ext))
}

fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Lists `(raw_name, path)` candidates of one `{module}/{kind}` directory.
fn candidate_files(dir: &Path, kind: ArtifactKind) -> Result<Vec<(String, PathBuf)>> {
    // Workflows may be a directory holding a `workflow.*` entry file.
    let max_depth = if kind == ArtifactKind::Workflow { 2 } else { 1 };
    let mut out = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_artifact_extension(entry.path()) {
            continue;
        }
        let path = entry.into_path();
        let raw_name = if path.parent() == Some(dir) {
            file_stem(&path).map(str::to_string)
        } else if file_stem(&path) == Some(WORKFLOW_ENTRY_STEM) {
            path.parent()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
                .map(str::to_string)
        } else {
            None
        };
        if let Some(raw_name) = raw_name {
            out.push((raw_name, path));
        }
    }
    Ok(out)
}

struct Collector<'a> {
    records: Vec<ArtifactRecord>,
    seen: HashMap<(String, ArtifactKind, String), PathBuf>,
    manifest: Option<&'a Manifest>,
    dup_log: Option<&'a mut Vec<DuplicateInfo>>,
}

impl Collector<'_> {
    fn log_duplicate(
        &mut self,
        module: &str,
        kind: ArtifactKind,
        name: &str,
        skipped: &Path,
        kept: &Path,
    ) {
        tracing::debug!(
            module,
            kind = %kind,
            name,
            skipped = %skipped.display(),
            kept = %kept.display(),
            "Skipping duplicate artifact"
        );
        if let Some(log) = self.dup_log.as_mut() {
            log.push(DuplicateInfo {
                module: module.to_string(),
                kind,
                name: name.to_string(),
                skipped_path: skipped.to_path_buf(),
                kept_path: kept.to_path_buf(),
            });
        }
    }

    fn consider(
        &mut self,
        module: &str,
        kind: ArtifactKind,
        raw_name: &str,
        path: PathBuf,
    ) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if file_name.contains(CUSTOMIZE_MARKER) {
            tracing::debug!(path = %path.display(), "Skipping customization override");
            return Ok(());
        }

        let name = sanitize_name(raw_name);
        if name.is_empty() {
            tracing::warn!(path = %path.display(), "Skipping artifact with unusable name");
            return Ok(());
        }

        if self
            .manifest
            .is_some_and(|m| m.excludes(module, kind, &name))
        {
            tracing::debug!(module, kind = %kind, name = %name, "Manifest marks artifact as not standalone");
            return Ok(());
        }

        let key = (module.to_string(), kind, name.clone());
        if let Some(kept) = self.seen.get(&key).cloned() {
            self.log_duplicate(module, kind, &name, &path, &kept);
            return Ok(());
        }

        let raw_content = fs::read_to_string(&path).map_err(|source| CollectError::Read {
            path: path.clone(),
            source,
        })?;
        if is_local_skip(&raw_content) {
            tracing::debug!(path = %path.display(), "Skipping artifact marked localskip");
            return Ok(());
        }

        let hash = hash_content(raw_content.as_bytes());
        self.seen.insert(key, path.clone());
        self.records.push(ArtifactRecord {
            module: module.to_string(),
            kind,
            name,
            source_path: path,
            raw_content,
            hash,
        });
        Ok(())
    }

    fn collect_module(&mut self, root: &Path, module: &str) -> Result<()> {
        for kind in ArtifactKind::ALL {
            let dir = root.join(module).join(kind.dir_name());
            if !dir.is_dir() {
                continue;
            }
            for (raw_name, path) in candidate_files(&dir, kind)? {
                self.consider(module, kind, &raw_name, path)?;
            }
        }
        Ok(())
    }

    fn collect_standalone(&mut self, root: &Path) -> Result<()> {
        let area = root.join(STANDALONE_DIR);
        if !area.is_dir() {
            return Ok(());
        }
        for entry in WalkDir::new(&area)
            .min_depth(2)
            .max_depth(2)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "md") {
                continue;
            }
            let dir_name = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            let stem = file_stem(path).unwrap_or_default();
            let raw_name = if stem == "agent" || stem == dir_name {
                dir_name
            } else {
                stem
            };

            let name = sanitize_name(raw_name);
            let kept = self
                .records
                .iter()
                .find(|r| r.kind == ArtifactKind::Agent && r.name == name)
                .map(|r| r.source_path.clone());
            if let Some(kept) = kept {
                self.log_duplicate(STANDALONE_MODULE, ArtifactKind::Agent, &name, path, &kept);
                continue;
            }

            let raw_name = raw_name.to_string();
            self.consider(
                STANDALONE_MODULE,
                ArtifactKind::Agent,
                &raw_name,
                entry.into_path(),
            )?;
        }
        Ok(())
    }
}

/// Collects artifacts from `core` plus `modules`, reading the default manifest
/// (`_config/manifest.yaml`) when present.
pub fn collect(content_root: &Path, modules: &[String]) -> Result<Vec<ArtifactRecord>> {
    let manifest = load_manifest(&content_root.join(DEFAULT_MANIFEST_PATH))?;
    let options = CollectOptions::new(content_root, modules).with_manifest(manifest);
    collect_with(&options, None)
}

/// Collects artifacts as configured by `options`.
///
/// Order is `core`, then the selected modules as given, then standalone
/// agents; kinds in [`ArtifactKind::ALL`] order and files sorted by name
/// within each directory. If `dup_log` is provided, every candidate dropped
/// because its identity was already collected is recorded there.
pub fn collect_with(
    options: &CollectOptions,
    dup_log: Option<&mut Vec<DuplicateInfo>>,
) -> Result<Vec<ArtifactRecord>> {
    let root = &options.content_root;
    if !root.is_dir() {
        return Err(CollectError::MissingInstallation {
            path: root.clone(),
            reason: "content root not found",
        }
        .into());
    }
    let core = root.join(CORE_MODULE);
    if !ArtifactKind::ALL
        .iter()
        .any(|kind| core.join(kind.dir_name()).is_dir())
    {
        return Err(CollectError::MissingInstallation {
            path: core,
            reason: "core module has no agents, tasks, tools or workflows directory",
        }
        .into());
    }

    let mut modules: Vec<&str> = vec![CORE_MODULE];
    for module in &options.modules {
        validate_module_name(module)?;
        if !modules.contains(&module.as_str()) {
            modules.push(module.as_str());
        }
    }

    let mut collector = Collector {
        records: Vec::new(),
        seen: HashMap::new(),
        manifest: options.manifest.as_ref(),
        dup_log,
    };
    for module in modules {
        if !root.join(module).is_dir() {
            tracing::debug!(module, "Module directory not present; treating as empty");
            continue;
        }
        collector.collect_module(root, module)?;
    }
    if options.include_standalone {
        collector.collect_standalone(root)?;
    }

    tracing::debug!(count = collector.records.len(), root = %root.display(), "Collected artifacts");
    Ok(collector.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use beat_test_utils::TestFixture;

    fn names(records: &[ArtifactRecord]) -> Vec<String> {
        records.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn sanitize_name_removes_path_traversal() {
        assert_eq!(sanitize_name("../../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_name("valid-name_123"), "valid-name_123");
        assert_eq!(sanitize_name("with spaces"), "withspaces");
        assert_eq!(sanitize_name("dev.story"), "devstory");
    }

    #[test]
    fn module_names_reject_hyphens_and_reserved() {
        assert!(validate_module_name("bmm").is_ok());
        assert!(validate_module_name("game_dev").is_ok());
        assert!(validate_module_name("game-dev").is_err());
        assert!(validate_module_name("").is_err());
        assert!(validate_module_name(STANDALONE_MODULE).is_err());
    }

    #[test]
    fn local_skip_detects_both_spellings() {
        assert!(is_local_skip("<agent localskip=\"true\">"));
        assert!(is_local_skip("---\nlocalskip: true\n---"));
        assert!(!is_local_skip("<agent localskip=\"false\">"));
    }

    #[test]
    fn hash_content_is_hex_sha256() {
        let hash = hash_content(b"hello");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn missing_root_is_missing_installation() {
        let fx = TestFixture::new().unwrap();
        let err = collect(&fx.content_root.join("absent"), &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CollectError>(),
            Some(CollectError::MissingInstallation { .. })
        ));
    }

    #[test]
    fn core_without_kind_dirs_is_missing_installation() {
        let fx = TestFixture::new().unwrap();
        let err = collect(&fx.content_root, &[]).unwrap_err();
        match err.downcast_ref::<CollectError>() {
            Some(CollectError::MissingInstallation { path, .. }) => {
                assert!(path.ends_with("core"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_optional_module_is_empty() {
        let fx = TestFixture::new().unwrap();
        fx.agent("core", "dev", "# Dev").unwrap();
        let records = collect(&fx.content_root, &["bmm".to_string()]).unwrap();
        assert_eq!(names(&records), vec!["core/agent/dev"]);
    }

    #[test]
    fn invalid_module_is_rejected() {
        let fx = TestFixture::new().unwrap();
        fx.agent("core", "dev", "# Dev").unwrap();
        let err = collect(&fx.content_root, &["my-mod".to_string()]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CollectError>(),
            Some(CollectError::InvalidModule { .. })
        ));
    }

    #[test]
    fn order_is_core_then_modules_then_kinds_then_names() {
        let fx = TestFixture::new().unwrap();
        fx.workflow("core", "party", "# Party").unwrap();
        fx.agent("core", "pm", "# PM").unwrap();
        fx.agent("core", "analyst", "# Analyst").unwrap();
        fx.task("bmm", "review", "# Review").unwrap();
        fx.agent("cis", "muse", "# Muse").unwrap();

        let modules = vec!["cis".to_string(), "bmm".to_string(), "cis".to_string()];
        let records = collect(&fx.content_root, &modules).unwrap();
        assert_eq!(
            names(&records),
            vec![
                "core/agent/analyst",
                "core/agent/pm",
                "core/workflow/party",
                "cis/agent/muse",
                "bmm/task/review",
            ]
        );
    }

    #[test]
    fn customize_and_localskip_files_are_filtered() {
        let fx = TestFixture::new().unwrap();
        fx.agent("core", "dev", "# Dev").unwrap();
        fx.write("core/agents/dev.customize.yaml", "persona: {}").unwrap();
        fx.agent("core", "secret", "<agent localskip=\"true\">").unwrap();

        let records = collect(&fx.content_root, &[]).unwrap();
        assert_eq!(names(&records), vec!["core/agent/dev"]);
    }

    #[test]
    fn same_identity_keeps_first_in_sort_order() {
        let fx = TestFixture::new().unwrap();
        fx.write("core/tasks/shard.md", "md").unwrap();
        fx.write("core/tasks/shard.xml", "xml").unwrap();

        let mut dups = Vec::new();
        let options = CollectOptions::new(&fx.content_root, &[]);
        let records = collect_with(&options, Some(&mut dups)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].raw_content, "md");
        assert_eq!(dups.len(), 1);
        assert!(dups[0].skipped_path.ends_with("shard.xml"));
    }

    #[test]
    fn directory_workflows_use_directory_name() {
        let fx = TestFixture::new().unwrap();
        fx.write("core/workflows/dev-story/workflow.yaml", "name: dev-story")
            .unwrap();
        fx.write("core/workflows/dev-story/instructions.md", "steps")
            .unwrap();

        let records = collect(&fx.content_root, &[]).unwrap();
        assert_eq!(names(&records), vec!["core/workflow/dev-story"]);
    }

    #[test]
    fn unsupported_extensions_and_hidden_files_are_ignored() {
        let fx = TestFixture::new().unwrap();
        fx.write("core/agents/dev.md", "# Dev").unwrap();
        fx.write("core/agents/notes.txt", "nope").unwrap();
        fx.write("core/agents/.draft.md", "nope").unwrap();

        let records = collect(&fx.content_root, &[]).unwrap();
        assert_eq!(names(&records), vec!["core/agent/dev"]);
    }

    #[test]
    fn standalone_agents_take_pseudo_module() {
        let fx = TestFixture::new().unwrap();
        fx.agent("core", "dev", "# Dev").unwrap();
        fx.write("agents/writer/writer.md", "# Writer").unwrap();
        fx.write("agents/coach/agent.md", "# Coach").unwrap();

        let records = collect(&fx.content_root, &[]).unwrap();
        assert_eq!(
            names(&records),
            vec![
                "core/agent/dev",
                "standalone/agent/coach",
                "standalone/agent/writer"
            ]
        );
    }

    #[test]
    fn standalone_agent_shadowed_by_module_agent_is_skipped() {
        let fx = TestFixture::new().unwrap();
        fx.agent("core", "dev", "# Dev").unwrap();
        fx.write("agents/dev/dev.md", "# Other Dev").unwrap();

        let mut dups = Vec::new();
        let options = CollectOptions::new(&fx.content_root, &[]);
        let records = collect_with(&options, Some(&mut dups)).unwrap();

        assert_eq!(names(&records), vec!["core/agent/dev"]);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].module, STANDALONE_MODULE);
    }

    #[test]
    fn manifest_excludes_non_standalone_tasks() {
        let fx = TestFixture::new().unwrap();
        fx.task("core", "index-docs", "# Index").unwrap();
        fx.task("core", "shard-doc", "# Shard").unwrap();
        fx.write(
            DEFAULT_MANIFEST_PATH,
            "tasks:\n  - { module: core, name: shard-doc, standalone: false }\n",
        )
        .unwrap();

        let records = collect(&fx.content_root, &[]).unwrap();
        assert_eq!(names(&records), vec!["core/task/index-docs"]);
    }

    #[test]
    fn records_carry_content_and_hash() {
        let fx = TestFixture::new().unwrap();
        let path = fx.agent("core", "dev", "# Dev").unwrap();

        let records = collect(&fx.content_root, &[]).unwrap();
        assert_eq!(records[0].source_path, path);
        assert_eq!(records[0].raw_content, "# Dev");
        assert_eq!(records[0].hash, hash_content(b"# Dev"));
    }

    #[test]
    fn collect_errors_on_unreadable_file() {
        use std::os::unix::fs::PermissionsExt;

        let fx = TestFixture::new().unwrap();
        let path = fx.agent("core", "dev", "secret").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o000);
        fs::set_permissions(&path, perms).unwrap();

        // Root ignores permission bits; nothing to assert there.
        if fs::read(&path).is_ok() {
            return;
        }

        let err = collect(&fx.content_root, &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CollectError>(),
            Some(CollectError::Read { .. })
        ));
    }
}
