//! Shared configuration for the CoreDNS operator.
//!
//! TOML file + environment layering, path resolution for the config file
//! and the local state directory, and translation to
//! `coredns_operator_core::CharmConfig`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coredns_operator_core::CharmConfig;

/// Prefix for environment overrides, e.g. `COREDNS_OPERATOR_CHARM__FORWARD`.
pub const ENV_PREFIX: &str = "COREDNS_OPERATOR_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Config {
    /// Values the reconciler renders into the Corefile.
    #[serde(default)]
    pub charm: CharmConfig,

    /// Tool defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Defaults {
    /// Where local workload and unit state live. Platform data dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

impl Config {
    /// State directory from config, falling back to the platform default.
    pub fn state_dir(&self) -> PathBuf {
        self.defaults.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    /// Set a dotted key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "forward" | "charm.forward" => self.charm.forward = value.into(),
            "extra_servers" | "extra-servers" | "charm.extra_servers" => {
                self.charm.extra_servers = value.into();
            }
            "state_dir" | "state-dir" | "defaults.state_dir" => {
                if value.trim().is_empty() {
                    return Err(ConfigError::Validation {
                        field: "state_dir".into(),
                        reason: "path cannot be empty".into(),
                    });
                }
                self.defaults.state_dir = Some(value.into());
            }
            other => {
                return Err(ConfigError::Validation {
                    field: other.into(),
                    reason: format!(
                        "unknown config key '{other}'. Valid keys: forward, extra_servers, \
                         state_dir"
                    ),
                });
            }
        }
        Ok(())
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "coredns-operator", "coredns-operator")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default directory for local workload and unit state.
pub fn default_state_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("state"),
        |dirs| dirs.data_dir().join("state"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("coredns-operator");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

/// Load config from `path` layered over defaults, then the environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = file_figment(path).merge(Env::prefixed(ENV_PREFIX).split("__"));
    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load only what is stored in `path`, without environment overrides.
///
/// Use this before editing and saving, so overrides never leak into the file.
pub fn load_file_config(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = file_figment(path).extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
