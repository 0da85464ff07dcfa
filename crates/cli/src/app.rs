use crate::cli::{Cli, Commands, ConfigAction, SourceArgs, TargetArgs};
use crate::select::{lookup, parse_kinds, resolve_names, to_targets};
use anyhow::{anyhow, bail, Context, Result};
use beat_discovery::{
    collect_with, load_manifest, ArtifactRecord, CollectOptions, DuplicateInfo,
    DEFAULT_MANIFEST_PATH,
};
use beat_state::{
    default_config_path, default_content_root, env_keep_going, modules_from_env, ConfigStore,
    ENABLED_KEY, KINDS_KEY,
};
use beat_sync::{all_targets, uninstall, InstallParams, InstallReport, Installer, TargetOutcome};
use clap::Parser;
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// The main entry point for the `beat` application.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };
    let config_path = cli
        .config
        .unwrap_or_else(|| default_config_path(&project_dir));

    match cli.command {
        Commands::Install { source, selection } => {
            handle_install(&project_dir, &config_path, &source, &selection)
        }
        Commands::Clean { selection } => handle_clean(&project_dir, &config_path, &selection),
        Commands::List { source, json } => handle_list(&project_dir, &source, json),
        Commands::Targets { json } => handle_targets(json),
        Commands::Config { action } => handle_config(&config_path, action),
    }
}

fn collect_artifacts(
    project_dir: &Path,
    source: &SourceArgs,
    dup_log: Option<&mut Vec<DuplicateInfo>>,
) -> Result<(PathBuf, Vec<ArtifactRecord>)> {
    let content_root = resolve_content_root(project_dir, source.content_root.as_deref());
    let modules = if source.modules.is_empty() {
        modules_from_env()
    } else {
        source.modules.clone()
    };
    let manifest = load_manifest(&content_root.join(DEFAULT_MANIFEST_PATH))?;
    let options = CollectOptions::new(&content_root, &modules).with_manifest(manifest);
    let artifacts = collect_with(&options, dup_log)?;
    tracing::info!(
        root = %content_root.display(),
        modules = ?modules,
        artifacts = artifacts.len(),
        "Collected artifacts"
    );
    Ok((content_root, artifacts))
}

/// A relative `--content-root` is taken from the project directory.
fn resolve_content_root(project_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(root) => project_dir.join(root),
        None => default_content_root(project_dir),
    }
}

fn select_targets(
    selection: &TargetArgs,
    store: &ConfigStore,
    project_dir: &Path,
) -> Result<Vec<beat_sync::RenderTarget>> {
    let interactive = std::io::stdin().is_terminal();
    let names = resolve_names(&selection.targets, store, interactive)?;
    to_targets(&names, store, project_dir)
}

fn finish(report: &InstallReport, project_dir: &Path, dry_run: bool) -> Result<()> {
    print!("{}", report.format_summary(project_dir));
    if dry_run {
        println!("(dry run - no changes made)");
    }
    if !report.success() {
        let failed = report.failures().count();
        let skipped = report.not_attempted.len();
        bail!("{failed} target(s) failed, {skipped} not attempted");
    }
    Ok(())
}

fn handle_install(
    project_dir: &Path,
    config_path: &Path,
    source: &SourceArgs,
    selection: &TargetArgs,
) -> Result<()> {
    let (content_root, artifacts) = collect_artifacts(project_dir, source, None)?;
    let mut store = ConfigStore::load(config_path)?;
    let targets = select_targets(selection, &store, project_dir)?;

    println!(
        "Installing {} artifact(s) from {} into {} target(s)",
        artifacts.len(),
        content_root.display(),
        targets.len()
    );

    let params = InstallParams {
        project_dir: project_dir.to_path_buf(),
        dry_run: selection.dry_run,
        keep_going: selection.keep_going || env_keep_going(),
    };
    let report = Installer::new(&artifacts).install_all(&targets, &params);

    if !params.dry_run {
        let mut changed = false;
        for installed in report.installed() {
            if store.get(&installed.target, ENABLED_KEY) != Some("true") {
                store.set(&installed.target, ENABLED_KEY, "true");
                changed = true;
            }
        }
        if changed {
            store.save()?;
        }
    }

    finish(&report, project_dir, params.dry_run)
}

fn handle_clean(project_dir: &Path, config_path: &Path, selection: &TargetArgs) -> Result<()> {
    let mut store = ConfigStore::load(config_path)?;
    let targets = select_targets(selection, &store, project_dir)?;
    let keep_going = selection.keep_going || env_keep_going();

    let mut report = InstallReport::default();
    for (idx, target) in targets.iter().enumerate() {
        match uninstall(target, project_dir, selection.dry_run) {
            Ok(cleaned) => report.outcomes.push(TargetOutcome::Installed(cleaned)),
            Err(err) => {
                tracing::warn!(target_name = %target.name, error = %err, "Target cleanup failed");
                report.outcomes.push(TargetOutcome::Failed {
                    target: target.name.clone(),
                    error: err.to_string(),
                });
                if !keep_going {
                    report.not_attempted =
                        targets[idx + 1..].iter().map(|t| t.name.clone()).collect();
                    break;
                }
            }
        }
    }

    if !selection.dry_run {
        let cleaned: Vec<String> = report.installed().map(|r| r.target.clone()).collect();
        for target in &cleaned {
            store.remove(target, ENABLED_KEY);
        }
        if !cleaned.is_empty() && config_path.exists() {
            store.save()?;
        }
    }

    finish(&report, project_dir, selection.dry_run)
}

#[derive(Serialize)]
struct ListedArtifact<'a> {
    module: &'a str,
    kind: beat_discovery::ArtifactKind,
    name: &'a str,
    source_path: &'a Path,
    hash: &'a str,
}

fn handle_list(project_dir: &Path, source: &SourceArgs, json: bool) -> Result<()> {
    let mut duplicates = Vec::new();
    let (_, artifacts) = collect_artifacts(project_dir, source, Some(&mut duplicates))?;

    if json {
        let listed: Vec<ListedArtifact<'_>> = artifacts
            .iter()
            .map(|a| ListedArtifact {
                module: &a.module,
                kind: a.kind,
                name: &a.name,
                source_path: &a.source_path,
                hash: &a.hash,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if artifacts.is_empty() {
        println!("No artifacts found.");
    }
    for artifact in &artifacts {
        println!(
            "{:<12} {:<9} {:<32} {}",
            artifact.module,
            artifact.kind.label(),
            artifact.name,
            &artifact.hash[..artifact.hash.len().min(12)]
        );
    }
    for dup in &duplicates {
        println!(
            "duplicate {}/{}/{}: {} (kept {})",
            dup.module,
            dup.kind,
            dup.name,
            dup.skipped_path.display(),
            dup.kept_path.display()
        );
    }
    Ok(())
}

fn handle_targets(json: bool) -> Result<()> {
    let targets = all_targets();
    if json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }
    for t in &targets {
        println!(
            "{:<16} {:<20} {:<24} {:<7} {:<12} {}",
            t.name,
            t.display_name,
            t.root.display(),
            format!("{:?}", t.naming).to_lowercase(),
            format!("{:?}", t.envelope).to_lowercase(),
            t.cleanup
        );
    }
    Ok(())
}

fn handle_config(config_path: &Path, action: ConfigAction) -> Result<()> {
    let mut store = ConfigStore::load(config_path)?;
    match action {
        ConfigAction::Get { target, key } => {
            let target = canonical_target(&target)?;
            let value = store
                .get(&target, &key)
                .ok_or_else(|| anyhow!("{target}.{key} is not set"))?;
            println!("{value}");
        }
        ConfigAction::Set { target, key, value } => {
            let target = canonical_target(&target)?;
            if key == KINDS_KEY {
                parse_kinds(&target, &value)?;
            }
            store.set(&target, &key, value);
            store.save()?;
        }
        ConfigAction::Unset { target, key } => {
            let target = canonical_target(&target)?;
            if store.remove(&target, &key).is_some() {
                store.save()?;
            }
        }
        ConfigAction::Show { target } => match target {
            Some(target) => {
                let target = canonical_target(&target)?;
                for (key, value) in store.target(&target).into_iter().flatten() {
                    println!("{key} = {value}");
                }
            }
            None => println!("{}", store.to_json()?),
        },
    }
    Ok(())
}

fn canonical_target(name: &str) -> Result<String> {
    Ok(lookup(name)?.name)
}
