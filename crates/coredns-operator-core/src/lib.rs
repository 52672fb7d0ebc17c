//! Reconciliation core for a CoreDNS operator.
//!
//! This crate owns the domain model and the event-driven reconciler that
//! keeps a CoreDNS workload in line with the operator's configuration:
//!
//! - **[`Reconciler`]**: Handlers for `install`, `coredns-pebble-ready`,
//!   `config-changed`, `leader-elected` and `dns-provider-relation-changed`.
//!   Each returns a [`Reconciliation`] with the new [`UnitStatus`] instead of
//!   mutating global state; callers persist it.
//!
//! - **[`Dispatcher`]**: Explicit table from [`EventName`] to handler,
//!   driven by a caller-owned loop.
//!
//! - **[`Workload`] / [`UnitModel`]**: Seams for the container supervisor
//!   and for leadership, relation data and bindings. [`local`] provides
//!   file-backed implementations; tests use in-memory fakes.
//!
//! - **[`corefile`]**: Corefile rendering from [`CharmConfig`] plus a brace
//!   linter for operator-supplied server blocks.

pub mod config;
pub mod corefile;
pub mod error;
pub mod event;
pub mod local;
pub mod model;
pub mod reconciler;
pub mod unit;
pub mod workload;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CharmConfig, DEFAULT_FORWARD};
pub use error::CoreError;
pub use event::{Context, Dispatcher, Event, EventName, Handler};
pub use local::{LocalUnit, LocalWorkload};
pub use reconciler::{Action, Reconciler, Reconciliation, SkipReason};
pub use unit::UnitModel;
pub use workload::Workload;

pub use model::{
    DnsProviderData, Layer, Plan, Relation, RelationData, RelationId, ServiceInfo, ServiceStatus,
    UnitStatus,
};
