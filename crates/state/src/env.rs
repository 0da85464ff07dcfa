use anyhow::Result;
use std::path::{Path, PathBuf};

/// Default content root, relative to the project directory.
pub const DEFAULT_CONTENT_DIR: &str = "beat";
/// Default config store location, relative to the project directory.
pub const DEFAULT_CONFIG_FILE: &str = ".beat/targets.json";

fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    #[cfg(unix)]
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("home directory not found"))
}

/// Expands a leading `~` to the home directory. Other paths are returned as-is.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path == "~" {
        return home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => Ok(home_dir()?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}

/// Content root used when neither `--content-root` nor `BEAT_CONTENT_ROOT` is given.
pub fn default_content_root(project_dir: &Path) -> PathBuf {
    project_dir.join(DEFAULT_CONTENT_DIR)
}

/// Returns modules listed in `BEAT_MODULES` (comma-separated).
pub fn modules_from_env() -> Vec<String> {
    env_list("BEAT_MODULES")
}

/// Returns target keys listed in `BEAT_TARGETS` (comma-separated).
pub fn targets_from_env() -> Vec<String> {
    env_list("BEAT_TARGETS")
}

/// Checks if `BEAT_KEEP_GOING` environment variable is set to true.
pub fn env_keep_going() -> bool {
    std::env::var("BEAT_KEEP_GOING")
        .map(|s| s == "1" || s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Config store path used when neither `--config` nor `BEAT_CONFIG` is given.
pub fn default_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(DEFAULT_CONFIG_FILE)
}
