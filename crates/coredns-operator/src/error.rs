//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use coredns_operator_config::ConfigError;
use coredns_operator_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Workload ─────────────────────────────────────────────────────
    #[error("Cannot connect to workload container '{container}'")]
    #[diagnostic(
        code(coredns::workload_unreachable),
        help(
            "The simulated supervisor is disconnected.\n\
             Run: coredns-operator workload connect"
        )
    )]
    WorkloadUnreachable { container: String },

    #[error("Workload operation failed: {message}")]
    #[diagnostic(code(coredns::workload))]
    Workload { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(coredns::not_found),
        help("Run: coredns-operator {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(coredns::validation))]
    Validation { field: String, reason: String },

    #[error("extra_servers has {count} brace problem(s)")]
    #[diagnostic(
        code(coredns::lint),
        help("{details}\nThe block is still written verbatim when dispatching events.")
    )]
    Lint { count: usize, details: String },

    // ── Configuration / state ────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(coredns::config),
        help("Check the config file. Show its location with: coredns-operator config path")
    )]
    Config(ConfigError),

    #[error("Corrupt state file {path}")]
    #[diagnostic(
        code(coredns::state),
        help("Fix or delete the file to start from a fresh state.")
    )]
    State {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(coredns::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::WorkloadUnreachable { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Config(_) | Self::State { .. } => exit_code::CONFIG,
            Self::Workload { .. } | Self::Lint { .. } | Self::Io(_) | Self::Render(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::WorkloadUnreachable { container } => {
                CliError::WorkloadUnreachable { container }
            }

            CoreError::ServiceNotFound { name } => CliError::NotFound {
                resource_type: "service".into(),
                identifier: name,
                list_command: "plan".into(),
            },

            CoreError::RelationNotFound { id } => CliError::NotFound {
                resource_type: "relation".into(),
                identifier: id.to_string(),
                list_command: "relation list".into(),
            },

            CoreError::FileNotFound { path } => CliError::NotFound {
                resource_type: "file".into(),
                identifier: path,
                list_command: "dispatch coredns-pebble-ready".into(),
            },

            CoreError::MissingRelation { name } => CliError::Validation {
                field: "--relation".into(),
                reason: format!("event '{name}' needs a relation id"),
            },

            CoreError::WrongEndpoint {
                id,
                endpoint,
                expected,
            } => CliError::Validation {
                field: "--relation".into(),
                reason: format!("relation {id} belongs to '{endpoint}', not '{expected}'"),
            },

            CoreError::SelfRelation { app } => CliError::Validation {
                field: "remote_app".into(),
                reason: format!("'{app}' is this unit's own application"),
            },

            CoreError::InvalidPath { path, reason } => CliError::Validation {
                field: "path".into(),
                reason: format!("{path}: {reason}"),
            },

            err @ (CoreError::LayerExists { .. } | CoreError::UnhandledEvent { .. }) => {
                CliError::Workload {
                    message: err.to_string(),
                }
            }

            CoreError::State { path, source } => CliError::State {
                path: path.display().to_string(),
                source,
            },

            CoreError::Io(e) => CliError::Io(e),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}
