//! Install orchestrator: render, clean up, then write, one target at a time.

use crate::adapters::{RenderTarget, OWNERSHIP_MARKER};
use crate::cleanup::{cleanup, cleanup_candidates};
use crate::error::InstallError;
use crate::render::{render, RenderedFile};
use crate::report::{InstallReport, TargetOutcome, TargetReport};
use beat_discovery::ArtifactRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Parameters for an install operation.
///
/// ```
/// use beat_sync::InstallParams;
///
/// let params = InstallParams { dry_run: true, ..Default::default() };
/// assert!(!params.keep_going);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallParams {
    /// Directory target roots are resolved against.
    pub project_dir: PathBuf,
    /// Report what would change without touching the filesystem.
    #[serde(default)]
    pub dry_run: bool,
    /// Continue with the remaining targets after one fails.
    #[serde(default)]
    pub keep_going: bool,
}

/// Installs one collected artifact set into any number of targets.
pub struct Installer<'a> {
    artifacts: &'a [ArtifactRecord],
}

impl<'a> Installer<'a> {
    pub fn new(artifacts: &'a [ArtifactRecord]) -> Self {
        Self { artifacts }
    }

    /// Renders every accepted artifact for `target`, without I/O.
    ///
    /// Fails with [`InstallError::PathCollision`] when two artifacts map to
    /// the same destination. Output is sorted by destination.
    pub fn plan(&self, target: &RenderTarget) -> Result<Vec<RenderedFile>, InstallError> {
        let mut owners: HashMap<PathBuf, String> = HashMap::new();
        let mut files = Vec::new();
        for artifact in self.artifacts.iter().filter(|a| target.accepts(a.kind)) {
            let rendered = render(artifact, target);
            if let Some(first) = owners.insert(rendered.destination_path.clone(), artifact.id()) {
                return Err(InstallError::PathCollision {
                    path: rendered.destination_path,
                    first,
                    second: artifact.id(),
                });
            }
            files.push(rendered);
        }
        files.sort_by(|a, b| a.destination_path.cmp(&b.destination_path));
        Ok(files)
    }

    /// Replaces this tool's previous output under `target` with a fresh render.
    ///
    /// Rendering happens before anything is deleted, so a collision leaves the
    /// existing install untouched.
    pub fn install(
        &self,
        target: &RenderTarget,
        params: &InstallParams,
    ) -> Result<TargetReport, InstallError> {
        let files = self.plan(target)?;
        let root = params.project_dir.join(&target.root);

        let removed = if params.dry_run {
            cleanup_candidates(&root, OWNERSHIP_MARKER, target.cleanup)?.len()
        } else {
            cleanup(&root, OWNERSHIP_MARKER, target.cleanup)?
        };

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let dest = params.project_dir.join(&file.destination_path);
            if !params.dry_run {
                write_file(&dest, &file.content)?;
            }
            written.push(dest);
        }

        tracing::info!(
            target_name = %target.name,
            root = %root.display(),
            removed,
            written = written.len(),
            dry_run = params.dry_run,
            "Installed target"
        );

        Ok(TargetReport {
            target: target.name.clone(),
            root,
            removed,
            written: written.len(),
            files: written,
            dry_run: params.dry_run,
        })
    }

    /// Installs every target in order. Each target's outcome is independent;
    /// without `keep_going` the first failure stops the run and the rest are
    /// listed as not attempted.
    pub fn install_all(&self, targets: &[RenderTarget], params: &InstallParams) -> InstallReport {
        let mut report = InstallReport::default();
        for (idx, target) in targets.iter().enumerate() {
            match self.install(target, params) {
                Ok(target_report) => report
                    .outcomes
                    .push(TargetOutcome::Installed(target_report)),
                Err(err) => {
                    tracing::warn!(target_name = %target.name, error = %err, "Target install failed");
                    report.outcomes.push(TargetOutcome::Failed {
                        target: target.name.clone(),
                        error: err.to_string(),
                    });
                    if !params.keep_going {
                        report.not_attempted =
                            targets[idx + 1..].iter().map(|t| t.name.clone()).collect();
                        break;
                    }
                }
            }
        }
        report
    }
}

/// Removes this tool's output under `target` without writing anything.
pub fn uninstall(
    target: &RenderTarget,
    project_dir: &Path,
    dry_run: bool,
) -> Result<TargetReport, InstallError> {
    let root = project_dir.join(&target.root);
    let removed = if dry_run {
        cleanup_candidates(&root, OWNERSHIP_MARKER, target.cleanup)?.len()
    } else {
        cleanup(&root, OWNERSHIP_MARKER, target.cleanup)?
    };
    tracing::info!(target_name = %target.name, removed, dry_run, "Cleaned target");
    Ok(TargetReport {
        target: target.name.clone(),
        root,
        removed,
        dry_run,
        ..Default::default()
    })
}

fn write_file(dest: &Path, content: &str) -> Result<(), InstallError> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| InstallError::Write { path, source }
    };
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(write_err(parent))?;
    }
    fs::write(dest, content).map_err(write_err(dest))
}
