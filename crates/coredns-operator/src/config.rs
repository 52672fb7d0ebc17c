//! CLI configuration: thin wrapper around `coredns_operator_config`.
//!
//! Adds resolution that respects the `--config` and `--state-dir` flags.

use std::path::PathBuf;

use tracing::debug;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use coredns_operator_config::{Config, load_config_from, load_file_config, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file path: `--config` flag (or its env var), then the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(coredns_operator_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_path(global);
    debug!(path = %path.display(), "loading config");
    Ok(load_config_from(&path)?)
}

/// State directory: `--state-dir` flag, then the config file, then the platform default.
pub fn state_dir(global: &GlobalOpts, config: &Config) -> PathBuf {
    global
        .state_dir
        .clone()
        .unwrap_or_else(|| config.state_dir())
}
