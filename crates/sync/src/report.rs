//! Install reporting types for tracking what each target received.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    /// Target selection key.
    pub target: String,
    /// Resolved destination root.
    pub root: PathBuf,
    /// Previously installed entries removed (or that would be removed).
    pub removed: usize,
    /// Files written (or that would be written).
    pub written: usize,
    /// Written destinations, sorted.
    pub files: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Result of one target within a multi-target install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TargetOutcome {
    Installed(TargetReport),
    Failed { target: String, error: String },
}

impl TargetOutcome {
    pub fn target(&self) -> &str {
        match self {
            Self::Installed(report) => &report.target,
            Self::Failed { target, .. } => target,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Complete report across every selected target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub outcomes: Vec<TargetOutcome>,
    /// Targets skipped because an earlier one failed and keep-going was off.
    pub not_attempted: Vec<String>,
}

impl InstallReport {
    /// True when every selected target was installed.
    pub fn success(&self) -> bool {
        self.not_attempted.is_empty() && !self.outcomes.iter().any(TargetOutcome::is_failure)
    }

    /// Returns total files written across all targets.
    pub fn total_written(&self) -> usize {
        self.installed().map(|r| r.written).sum()
    }

    /// Returns total entries removed across all targets.
    pub fn total_removed(&self) -> usize {
        self.installed().map(|r| r.removed).sum()
    }

    pub fn installed(&self) -> impl Iterator<Item = &TargetReport> {
        self.outcomes.iter().filter_map(|o| match o {
            TargetOutcome::Installed(report) => Some(report),
            TargetOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            TargetOutcome::Failed { target, error } => Some((target.as_str(), error.as_str())),
            TargetOutcome::Installed(_) => None,
        })
    }

    /// Generates a formatted summary for display, with roots shown relative
    /// to `project_dir` where possible.
    pub fn format_summary(&self, project_dir: &Path) -> String {
        let mut out = String::new();
        for outcome in &self.outcomes {
            match outcome {
                TargetOutcome::Installed(report) => {
                    let root = pathdiff::diff_paths(&report.root, project_dir)
                        .unwrap_or_else(|| report.root.clone());
                    let verb = if report.dry_run { "would write" } else { "wrote" };
                    out.push_str(&format!(
                        "  {:<16} {} {} file(s), removed {} -> {}\n",
                        report.target,
                        verb,
                        report.written,
                        report.removed,
                        root.display()
                    ));
                }
                TargetOutcome::Failed { target, error } => {
                    out.push_str(&format!("  {target:<16} FAILED: {error}\n"));
                }
            }
        }
        for target in &self.not_attempted {
            out.push_str(&format!("  {target:<16} not attempted\n"));
        }
        out.push_str(&format!(
            "Total: {} written, {} removed\n",
            self.total_written(),
            self.total_removed()
        ));
        out
    }
}
