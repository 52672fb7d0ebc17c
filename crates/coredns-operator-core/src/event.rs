// ── Event dispatch ──
//
// An explicit table from event name to handler, invoked by a caller-owned
// loop (the CLI dispatches one event per invocation). Registration replaces
// the framework's observer wiring.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

use crate::error::CoreError;
use crate::model::RelationId;
use crate::reconciler::{Reconciler, Reconciliation};
use crate::unit::UnitModel;
use crate::workload::Workload;

/// Lifecycle events the operator reacts to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum EventName {
    Install,
    CorednsPebbleReady,
    ConfigChanged,
    LeaderElected,
    DnsProviderRelationChanged,
}

impl EventName {
    /// Whether the event is scoped to a single relation.
    pub fn is_relation_event(self) -> bool {
        matches!(self, Self::DnsProviderRelationChanged)
    }
}

/// A delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub name: EventName,
    pub relation: Option<RelationId>,
}

impl Event {
    pub fn new(name: EventName) -> Self {
        Self {
            name,
            relation: None,
        }
    }

    pub fn relation_changed(id: RelationId) -> Self {
        Self {
            name: EventName::DnsProviderRelationChanged,
            relation: Some(id),
        }
    }
}

/// Collaborators a handler operates on.
pub struct Context<'a> {
    pub workload: &'a mut dyn Workload,
    pub unit: &'a mut dyn UnitModel,
}

pub type Handler = fn(&Reconciler, &mut Context<'_>, &Event) -> Result<Reconciliation, CoreError>;

/// Event name to handler table.
pub struct Dispatcher {
    handlers: IndexMap<EventName, Handler>,
}

impl Dispatcher {
    /// A table with no handlers registered.
    pub fn empty() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }

    /// The operator's handlers for every known event.
    pub fn standard() -> Self {
        Self::empty()
            .on(EventName::Install, handle_install)
            .on(EventName::CorednsPebbleReady, handle_container_ready)
            .on(EventName::ConfigChanged, handle_config_changed)
            .on(EventName::LeaderElected, handle_leader_elected)
            .on(EventName::DnsProviderRelationChanged, handle_relation_changed)
    }

    /// Register `handler` for `name`, replacing any previous one.
    pub fn on(mut self, name: EventName, handler: Handler) -> Self {
        self.handlers.insert(name, handler);
        self
    }

    pub fn handles(&self, name: EventName) -> bool {
        self.handlers.contains_key(&name)
    }

    /// Events without a registered handler.
    pub fn unhandled(&self) -> Vec<EventName> {
        EventName::iter().filter(|n| !self.handles(*n)).collect()
    }

    pub fn dispatch(
        &self,
        reconciler: &Reconciler,
        ctx: &mut Context<'_>,
        event: &Event,
    ) -> Result<Reconciliation, CoreError> {
        let handler = self
            .handlers
            .get(&event.name)
            .ok_or(CoreError::UnhandledEvent { name: event.name })?;
        debug!(event = %event.name, relation = ?event.relation, "dispatching event");
        let outcome = handler(reconciler, ctx, event)?;
        if let Some(ref status) = outcome.status {
            debug!(event = %event.name, %status, "event handled");
        }
        Ok(outcome)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::standard()
    }
}

// ── Standard handlers ────────────────────────────────────────────────

fn handle_install(
    reconciler: &Reconciler,
    ctx: &mut Context<'_>,
    _event: &Event,
) -> Result<Reconciliation, CoreError> {
    Ok(reconciler.on_install(&*ctx.workload))
}

fn handle_container_ready(
    reconciler: &Reconciler,
    ctx: &mut Context<'_>,
    _event: &Event,
) -> Result<Reconciliation, CoreError> {
    reconciler.on_container_ready(ctx.workload)
}

fn handle_config_changed(
    reconciler: &Reconciler,
    ctx: &mut Context<'_>,
    _event: &Event,
) -> Result<Reconciliation, CoreError> {
    reconciler.on_config_changed(ctx.workload)
}

fn handle_leader_elected(
    reconciler: &Reconciler,
    ctx: &mut Context<'_>,
    _event: &Event,
) -> Result<Reconciliation, CoreError> {
    reconciler.on_leader_elected(&*ctx.workload, ctx.unit)
}

fn handle_relation_changed(
    reconciler: &Reconciler,
    ctx: &mut Context<'_>,
    event: &Event,
) -> Result<Reconciliation, CoreError> {
    let relation = event
        .relation
        .ok_or(CoreError::MissingRelation { name: event.name })?;
    reconciler.on_dns_provider_relation_changed(&*ctx.workload, ctx.unit, relation)
}
