//! Shared test utilities for beat crates.
//!
//! Provides a content-tree fixture laid out the way the installer expects
//! (`{module}/{kind}/{name}.<ext>`) next to an empty project directory that
//! targets install into.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = beat_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value" until _guard drops
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Content tree plus project directory inside one tempdir.
///
/// The tempdir is removed when this struct is dropped.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// Root of the source content tree (`<tmp>/content`).
    pub content_root: PathBuf,
    /// Project directory targets install into (`<tmp>/project`).
    pub project_dir: PathBuf,
}

impl TestFixture {
    /// Creates `<tmp>/content/core` and `<tmp>/project`.
    ///
    /// `core` starts without kind directories; add artifacts to make it a
    /// valid installation.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let content_root = tempdir.path().join("content");
        let project_dir = tempdir.path().join("project");

        std::fs::create_dir_all(content_root.join("core"))?;
        std::fs::create_dir_all(&project_dir)?;

        Ok(Self {
            tempdir,
            content_root,
            project_dir,
        })
    }

    /// Writes `content` to `content_root/rel`, creating parent directories.
    pub fn write(&self, rel: impl AsRef<Path>, content: &str) -> std::io::Result<PathBuf> {
        let path = self.content_root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Writes `{module}/agents/{name}.md`.
    pub fn agent(&self, module: &str, name: &str, content: &str) -> std::io::Result<PathBuf> {
        self.write(format!("{module}/agents/{name}.md"), content)
    }

    /// Writes `{module}/tasks/{name}.md`.
    pub fn task(&self, module: &str, name: &str, content: &str) -> std::io::Result<PathBuf> {
        self.write(format!("{module}/tasks/{name}.md"), content)
    }

    /// Writes `{module}/tools/{name}.md`.
    pub fn tool(&self, module: &str, name: &str, content: &str) -> std::io::Result<PathBuf> {
        self.write(format!("{module}/tools/{name}.md"), content)
    }

    /// Writes `{module}/workflows/{name}.md`.
    pub fn workflow(&self, module: &str, name: &str, content: &str) -> std::io::Result<PathBuf> {
        self.write(format!("{module}/workflows/{name}.md"), content)
    }

    /// Writes a file directly into the project directory (e.g. user content
    /// that must survive cleanup).
    pub fn project_file(&self, rel: impl AsRef<Path>, content: &str) -> std::io::Result<PathBuf> {
        let path = self.project_dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Agent markup carrying an explicit `title` attribute.
pub fn titled_agent(name: &str, title: &str) -> String {
    format!(
        "<!-- Powered by beat -->\n\n```xml\n<agent id=\"{name}\" name=\"{name}\" title=\"{title}\">\n  <persona>Does things.</persona>\n</agent>\n```\n"
    )
}
