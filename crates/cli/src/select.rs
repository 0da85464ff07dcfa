//! Target selection: explicit flags, environment, config store, then prompt.

use anyhow::{anyhow, bail, Result};
use beat_discovery::{parse_kind_key, ArtifactKind};
use beat_state::{expand_tilde, targets_from_env, ConfigStore, KINDS_KEY, ROOT_KEY};
use beat_sync::{all_targets, find_target, target_names, RenderTarget};
use inquire::MultiSelect;
use std::path::{Component, Path, PathBuf};

/// Selection key expanding to every built-in target.
pub(crate) const ALL_KEYWORD: &str = "all";

/// Resolves target names by precedence: explicit, `BEAT_TARGETS`, enabled in
/// the store, interactive prompt. Fails when nothing selects any target.
pub(crate) fn resolve_names(
    explicit: &[String],
    store: &ConfigStore,
    interactive: bool,
) -> Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }
    let from_env = targets_from_env();
    if !from_env.is_empty() {
        return Ok(from_env);
    }
    let enabled = store.enabled_targets();
    if !enabled.is_empty() {
        tracing::debug!(targets = ?enabled, "Using targets enabled in config store");
        return Ok(enabled);
    }
    if interactive {
        return prompt_targets();
    }
    bail!("no targets selected; pass --target, set BEAT_TARGETS, or enable targets with `beat config set <target> enabled true`")
}

/// Turns names into targets, applying `root` and `kinds` overrides from the
/// store.
///
/// Unknown names are an error; duplicates are dropped keeping first position.
/// Resolved roots (against `project_dir`) must be disjoint: no two selected
/// targets may share a root or nest one inside the other.
pub(crate) fn to_targets(
    names: &[String],
    store: &ConfigStore,
    project_dir: &Path,
) -> Result<Vec<RenderTarget>> {
    let mut out: Vec<RenderTarget> = Vec::new();
    for name in names {
        let batch = if name.eq_ignore_ascii_case(ALL_KEYWORD) {
            all_targets()
        } else {
            vec![lookup(name)?]
        };
        for target in batch {
            if out.iter().any(|t| t.name == target.name) {
                continue;
            }
            out.push(apply_overrides(target, store)?);
        }
    }
    ensure_disjoint_roots(&out, project_dir)?;
    Ok(out)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn ensure_disjoint_roots(targets: &[RenderTarget], project_dir: &Path) -> Result<()> {
    let roots: Vec<PathBuf> = targets
        .iter()
        .map(|t| normalize(&project_dir.join(&t.root)))
        .collect();
    for (i, a) in roots.iter().enumerate() {
        for (j, b) in roots.iter().enumerate().skip(i + 1) {
            if a.starts_with(b) || b.starts_with(a) {
                bail!(
                    "targets '{}' and '{}' overlap ({} and {}); give one a different root with `beat config set <target> root <dir>`",
                    targets[i].name,
                    targets[j].name,
                    a.display(),
                    b.display()
                );
            }
        }
    }
    Ok(())
}

/// Parses a comma-separated `kinds` value for `target`.
pub(crate) fn parse_kinds(target: &str, value: &str) -> Result<Vec<ArtifactKind>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| {
            parse_kind_key(k).ok_or_else(|| anyhow!("unknown kind '{k}' in {target}.{KINDS_KEY}"))
        })
        .collect()
}

/// Looks up a built-in target, listing the known keys on failure.
pub(crate) fn lookup(name: &str) -> Result<RenderTarget> {
    find_target(name).ok_or_else(|| {
        anyhow!(
            "unknown target '{name}'; known targets: {}",
            target_names().join(", ")
        )
    })
}

fn apply_overrides(mut target: RenderTarget, store: &ConfigStore) -> Result<RenderTarget> {
    if let Some(root) = store.get(&target.name, ROOT_KEY) {
        let root = expand_tilde(root)?;
        tracing::debug!(target_name = %target.name, root = %root.display(), "Root override");
        target = target.with_root(root);
    }
    if let Some(kinds) = store.get(&target.name, KINDS_KEY) {
        // Narrows the preset; kinds the preset never receives stay excluded.
        let wanted = parse_kinds(&target.name, kinds)?;
        target.kinds.retain(|kind| wanted.contains(kind));
    }
    Ok(target)
}

fn prompt_targets() -> Result<Vec<String>> {
    let targets = all_targets();
    let items: Vec<String> = targets
        .iter()
        .map(|t| format!("{} ({})", t.display_name, t.name))
        .collect();
    let selected = MultiSelect::new(
        "Select targets to install into (space to toggle, enter to confirm)",
        items.clone(),
    )
    .prompt()?;
    if selected.is_empty() {
        bail!("no targets selected");
    }
    Ok(targets
        .into_iter()
        .zip(items)
        .filter(|(_, item)| selected.contains(item))
        .map(|(t, _)| t.name)
        .collect())
}
