// ── Core error types ──
//
// Framework-level failures only. Unmet preconditions (not leader, service
// not running, no ingress address) are reported as unit statuses by the
// reconciler and never surface here.

use std::path::PathBuf;

use thiserror::Error;

use crate::event::EventName;
use crate::model::RelationId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Workload errors ──────────────────────────────────────────────
    #[error("Cannot connect to workload container '{container}'")]
    WorkloadUnreachable { container: String },

    #[error("Service '{name}' is not defined in the workload plan")]
    ServiceNotFound { name: String },

    #[error("Layer '{label}' already exists (use combine to merge)")]
    LayerExists { label: String },

    #[error("Invalid workload path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("File not found in workload: {path}")]
    FileNotFound { path: String },

    // ── Model errors ─────────────────────────────────────────────────
    #[error("Relation {id} not found")]
    RelationNotFound { id: RelationId },

    #[error("Relation {id} is on endpoint '{endpoint}', expected '{expected}'")]
    WrongEndpoint {
        id: RelationId,
        endpoint: String,
        expected: &'static str,
    },

    #[error("Cannot relate application '{app}' to itself")]
    SelfRelation { app: String },

    #[error("No handler registered for event '{name}'")]
    UnhandledEvent { name: EventName },

    #[error("Event '{name}' requires a relation id")]
    MissingRelation { name: EventName },

    // ── Persistence errors ───────────────────────────────────────────
    #[error("Failed to read or write state file {path}: {source}")]
    State {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
