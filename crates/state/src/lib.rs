//! Manages installer settings.
//!
//! This crate provides utilities for:
//! - Reading `BEAT_*` environment variables.
//! - Persisting per-target settings (selection, root overrides) between runs.

pub mod env;
pub mod store;

pub use env::{
    default_config_path, default_content_root, env_keep_going, expand_tilde, home_dir,
    modules_from_env, targets_from_env, DEFAULT_CONFIG_FILE, DEFAULT_CONTENT_DIR,
};
pub use store::{ConfigStore, ENABLED_KEY, KINDS_KEY, ROOT_KEY};
