use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for the `beat` installer.
#[derive(Debug, Parser)]
#[command(
    name = "beat",
    version,
    about = "Installs agent, task, tool and workflow definitions into AI coding tools"
)]
pub struct Cli {
    /// Project directory target roots are resolved against (default: current directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,
    /// Per-target config store (default: `<project>/.beat/targets.json`).
    #[arg(long, global = true, env = "BEAT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Where definitions are collected from.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Content root holding `core/`, feature modules and `agents/` (default: `<project>/beat`).
    #[arg(long, env = "BEAT_CONTENT_ROOT", value_name = "DIR")]
    pub content_root: Option<PathBuf>,
    /// Feature modules to include besides `core` (repeatable or comma-separated; falls back to `BEAT_MODULES`).
    #[arg(long = "module", short = 'm', value_name = "NAME", value_delimiter = ',')]
    pub modules: Vec<String>,
}

/// Which targets an operation applies to.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Target keys, or `all` (repeatable or comma-separated; falls back to `BEAT_TARGETS`,
    /// then targets enabled in the config store, then an interactive prompt).
    #[arg(long = "target", short = 't', value_name = "NAME", value_delimiter = ',')]
    pub targets: Vec<String>,
    /// Continue with the remaining targets after one fails (also `BEAT_KEEP_GOING=1`).
    #[arg(long)]
    pub keep_going: bool,
    /// Report what would change without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,
}

/// Available `beat` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Collects definitions and (re)installs them into each selected target.
    Install {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        selection: TargetArgs,
    },
    /// Removes previously installed output from each selected target.
    #[command(alias = "uninstall")]
    Clean {
        #[command(flatten)]
        selection: TargetArgs,
    },
    /// Lists the definitions that would be installed.
    List {
        #[command(flatten)]
        source: SourceArgs,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Lists the supported targets and their conventions.
    Targets {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Reads or edits the per-target config store (`BEAT_CONFIG`).
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config store operations.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Prints one value.
    Get { target: String, key: String },
    /// Sets one value (e.g. `beat config set codex root ~/.codex/prompts`).
    Set {
        target: String,
        key: String,
        value: String,
    },
    /// Removes one value.
    Unset { target: String, key: String },
    /// Prints the whole store, or one target's settings.
    Show { target: Option<String> },
}
