// ── Reconciler ──
//
// Level-triggered handlers for the operator's lifecycle events. Each
// handler reads the current workload and unit state, performs the side
// effects that state calls for, and returns a `Reconciliation` carrying
// the new unit status. Nothing is remembered between calls.

use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

use crate::config::CharmConfig;
use crate::corefile::{self, COREFILE_PATH};
use crate::error::CoreError;
use crate::event::EventName;
use crate::model::status::{
    AWAITING_RELATION, NOT_RUNNING, STARTED, WAITING_FOR_LEADERSHIP, WAITING_TO_START,
};
use crate::model::{
    DNS_PROVIDER, DnsProviderData, LAYER_LABEL, Relation, RelationData, RelationId, SERVICE_NAME,
    UnitStatus, coredns_layer,
};
use crate::unit::UnitModel;
use crate::workload::Workload;

/// A side effect performed while handling an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    Pushed { path: String, bytes: usize },
    LayerAdded { label: String },
    Started { service: String },
    Published { relation: RelationId, data: RelationData },
}

/// Why a handler stopped before doing its main work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    #[strum(to_string = "CoreDNS already started")]
    AlreadyStarted,
    #[strum(to_string = "CoreDNS is not running")]
    NotRunning,
    #[strum(to_string = "unit is not the leader")]
    NotLeader,
    #[strum(to_string = "no ingress address on relation binding")]
    NoIngressAddress,
}

/// Result of handling one event.
///
/// `status` is `None` when the handler leaves the current status alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub event: EventName,
    pub status: Option<UnitStatus>,
    pub actions: Vec<Action>,
    pub skipped: Option<SkipReason>,
}

impl Reconciliation {
    fn new(event: EventName) -> Self {
        Self {
            event,
            status: None,
            actions: Vec::new(),
            skipped: None,
        }
    }

    fn with_status(mut self, status: UnitStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn skip(mut self, reason: SkipReason) -> Self {
        self.skipped = Some(reason);
        self
    }

    pub fn pushes(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, Action::Pushed { .. }))
            .count()
    }

    /// Data published by this reconciliation, if any.
    pub fn published(&self) -> Option<&RelationData> {
        self.actions.iter().find_map(|a| match a {
            Action::Published { data, .. } => Some(data),
            _ => None,
        })
    }
}

/// Outcome of the per-relation precondition chain.
struct RelationOutcome {
    status: UnitStatus,
    action: Option<Action>,
    skipped: Option<SkipReason>,
}

/// Applies the operator's configuration to a workload and its relations.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: CharmConfig,
}

impl Reconciler {
    pub fn new(config: CharmConfig) -> Self {
        Self { config }
    }

    /// Render the Corefile for the current configuration.
    pub fn corefile(&self) -> String {
        corefile::render(&self.config)
    }

    // ── Handlers ─────────────────────────────────────────────────────

    pub fn on_install(&self, workload: &dyn Workload) -> Reconciliation {
        let outcome = Reconciliation::new(EventName::Install);
        if workload.is_running(SERVICE_NAME) {
            return outcome;
        }
        outcome.with_status(UnitStatus::waiting(WAITING_TO_START))
    }

    /// Container became ready: push the Corefile, install the layer and
    /// start CoreDNS unless it already runs.
    pub fn on_container_ready(
        &self,
        workload: &mut dyn Workload,
    ) -> Result<Reconciliation, CoreError> {
        let mut outcome = Reconciliation::new(EventName::CorednsPebbleReady);
        if workload.is_running(SERVICE_NAME) {
            info!("{}", SkipReason::AlreadyStarted);
            return Ok(outcome.skip(SkipReason::AlreadyStarted));
        }

        outcome.actions.push(self.push_corefile(workload)?);

        workload.add_layer(LAYER_LABEL, &coredns_layer(), true)?;
        outcome.actions.push(Action::LayerAdded {
            label: LAYER_LABEL.into(),
        });

        workload.start(SERVICE_NAME)?;
        outcome.actions.push(Action::Started {
            service: SERVICE_NAME.into(),
        });
        info!(service = SERVICE_NAME, "started CoreDNS");

        Ok(outcome.with_status(UnitStatus::waiting(AWAITING_RELATION)))
    }

    /// Configuration changed: rewrite the Corefile if CoreDNS can pick it
    /// up. The `reload` plugin takes care of applying it, so no restart.
    pub fn on_config_changed(
        &self,
        workload: &mut dyn Workload,
    ) -> Result<Reconciliation, CoreError> {
        let mut outcome = Reconciliation::new(EventName::ConfigChanged);
        if !workload.is_running(SERVICE_NAME) {
            info!("{}", SkipReason::NotRunning);
            return Ok(outcome.skip(SkipReason::NotRunning));
        }
        outcome.actions.push(self.push_corefile(workload)?);
        Ok(outcome)
    }

    pub fn on_dns_provider_relation_changed(
        &self,
        workload: &dyn Workload,
        unit: &mut dyn UnitModel,
        relation: RelationId,
    ) -> Result<Reconciliation, CoreError> {
        let outcome = Reconciliation::new(EventName::DnsProviderRelationChanged);
        let result = Self::publish(workload, unit, relation)?;
        Ok(Self::apply_relation_outcome(outcome, result))
    }

    /// A new leader must take over publishing for every consumer.
    pub fn on_leader_elected(
        &self,
        workload: &dyn Workload,
        unit: &mut dyn UnitModel,
    ) -> Result<Reconciliation, CoreError> {
        let mut outcome = Reconciliation::new(EventName::LeaderElected);
        if !unit.is_leader() {
            return Ok(outcome
                .skip(SkipReason::NotLeader)
                .with_status(UnitStatus::waiting(WAITING_FOR_LEADERSHIP)));
        }
        if !workload.is_running(SERVICE_NAME) {
            return Ok(outcome
                .skip(SkipReason::NotRunning)
                .with_status(UnitStatus::waiting(WAITING_TO_START)));
        }

        let relations = unit.relations(DNS_PROVIDER);
        if relations.is_empty() {
            return Ok(outcome.with_status(UnitStatus::waiting(AWAITING_RELATION)));
        }
        for relation in relations {
            let result = Self::publish(workload, unit, relation.id)?;
            outcome = Self::apply_relation_outcome(outcome, result);
        }
        Ok(outcome)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn push_corefile(&self, workload: &mut dyn Workload) -> Result<Action, CoreError> {
        for issue in corefile::lint(&self.config.extra_servers) {
            warn!(%issue, "extra_servers looks malformed; writing it unchanged");
        }
        let content = self.corefile();
        workload.push(COREFILE_PATH, &content, true)?;
        debug!(path = COREFILE_PATH, bytes = content.len(), "pushed Corefile");
        Ok(Action::Pushed {
            path: COREFILE_PATH.into(),
            bytes: content.len(),
        })
    }

    /// Run the relation precondition chain, publishing when it passes.
    fn publish(
        workload: &dyn Workload,
        unit: &mut dyn UnitModel,
        id: RelationId,
    ) -> Result<RelationOutcome, CoreError> {
        if !unit.is_leader() {
            return Ok(RelationOutcome::skipped(
                SkipReason::NotLeader,
                UnitStatus::waiting(WAITING_FOR_LEADERSHIP),
            ));
        }
        if !workload.is_running(SERVICE_NAME) {
            return Ok(RelationOutcome::skipped(
                SkipReason::NotRunning,
                UnitStatus::waiting(NOT_RUNNING),
            ));
        }

        let relation: Relation = unit
            .relation(id)
            .ok_or(CoreError::RelationNotFound { id })?;
        if relation.endpoint != DNS_PROVIDER {
            return Err(CoreError::WrongEndpoint {
                id,
                endpoint: relation.endpoint,
                expected: DNS_PROVIDER,
            });
        }
        let Some(address) = unit.ingress_address(relation.id) else {
            debug!(relation = %relation.id, "ingress address not assigned yet");
            return Ok(RelationOutcome::skipped(
                SkipReason::NoIngressAddress,
                UnitStatus::maintenance(""),
            ));
        };

        let data = DnsProviderData::new(address).to_relation_data();
        let app = unit.app_name().to_owned();
        unit.update_relation_data(relation.id, &app, data.clone())?;
        info!(
            relation = %relation.id,
            remote_app = %relation.remote_app,
            sdn_ip = %address,
            "published dns-provider relation data"
        );

        Ok(RelationOutcome {
            status: UnitStatus::active(STARTED),
            action: Some(Action::Published {
                relation: relation.id,
                data,
            }),
            skipped: None,
        })
    }

    fn apply_relation_outcome(mut outcome: Reconciliation, result: RelationOutcome) -> Reconciliation {
        outcome.actions.extend(result.action);
        if result.skipped.is_some() {
            outcome.skipped = result.skipped;
        }
        outcome.with_status(result.status)
    }
}

impl RelationOutcome {
    fn skipped(reason: SkipReason, status: UnitStatus) -> Self {
        Self {
            status,
            action: None,
            skipped: Some(reason),
        }
    }
}
