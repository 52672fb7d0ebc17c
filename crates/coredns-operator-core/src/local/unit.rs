use std::net::IpAddr;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{read_state, write_state};
use crate::error::CoreError;
use crate::model::{Relation, RelationData, RelationId, UnitStatus};
use crate::unit::UnitModel;

pub const UNIT_STATE_FILE: &str = "unit.json";

/// Persisted unit status and when it last changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: UnitStatus,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RelationState {
    #[serde(flatten)]
    relation: Relation,
    #[serde(default)]
    ingress_address: Option<IpAddr>,
    /// Buckets keyed by owning application or unit name.
    #[serde(default)]
    data: IndexMap<String, RelationData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UnitState {
    app: String,
    unit: String,
    #[serde(default)]
    leader: bool,
    status: StatusRecord,
    #[serde(default)]
    next_relation_id: u32,
    #[serde(default)]
    relations: Vec<RelationState>,
}

impl Default for UnitState {
    fn default() -> Self {
        Self {
            app: "coredns".into(),
            unit: "coredns/0".into(),
            leader: false,
            status: StatusRecord {
                status: UnitStatus::Unknown,
                since: Utc::now(),
            },
            next_relation_id: 0,
            relations: Vec::new(),
        }
    }
}

/// Unit model persisted as JSON in a state directory.
#[derive(Debug)]
pub struct LocalUnit {
    path: PathBuf,
    state: UnitState,
}

impl LocalUnit {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = dir.into().join(UNIT_STATE_FILE);
        let state = read_state(&path)?;
        Ok(Self { path, state })
    }

    pub fn save(&self) -> Result<(), CoreError> {
        write_state(&self.path, &self.state)
    }

    pub fn set_leader(&mut self, leader: bool) {
        self.state.leader = leader;
    }

    pub fn status(&self) -> &StatusRecord {
        &self.state.status
    }

    /// Record a new status. The timestamp only moves when the status changes.
    pub fn set_status(&mut self, status: UnitStatus) {
        if self.state.status.status != status {
            debug!(%status, "unit status changed");
            self.state.status = StatusRecord {
                status,
                since: Utc::now(),
            };
        }
    }

    /// Establish a relation with `remote_app` on `endpoint`.
    ///
    /// Buckets are keyed by application name, so the remote side must not
    /// share the local application's name.
    pub fn add_relation(
        &mut self,
        endpoint: &str,
        remote_app: &str,
        units: Vec<String>,
    ) -> Result<RelationId, CoreError> {
        if remote_app == self.state.app {
            return Err(CoreError::SelfRelation {
                app: remote_app.into(),
            });
        }
        let id = RelationId(self.state.next_relation_id);
        self.state.next_relation_id += 1;

        let mut data = IndexMap::new();
        data.insert(self.state.app.clone(), RelationData::new());
        data.insert(remote_app.to_owned(), RelationData::new());

        self.state.relations.push(RelationState {
            relation: Relation {
                id,
                endpoint: endpoint.into(),
                remote_app: remote_app.into(),
                units,
            },
            ingress_address: None,
            data,
        });
        Ok(id)
    }

    pub fn remove_relation(&mut self, id: RelationId) -> Result<Relation, CoreError> {
        let index = self
            .state
            .relations
            .iter()
            .position(|r| r.relation.id == id)
            .ok_or(CoreError::RelationNotFound { id })?;
        Ok(self.state.relations.remove(index).relation)
    }

    /// Assign (or clear, with `None`) the ingress address of a relation's binding.
    pub fn bind(&mut self, id: RelationId, address: Option<IpAddr>) -> Result<(), CoreError> {
        self.find_mut(id)?.ingress_address = address;
        Ok(())
    }

    pub fn all_relations(&self) -> Vec<Relation> {
        self.state.relations.iter().map(|r| r.relation.clone()).collect()
    }

    /// Every data bucket of a relation, keyed by owner.
    pub fn buckets(&self, id: RelationId) -> Result<&IndexMap<String, RelationData>, CoreError> {
        Ok(&self.find(id)?.data)
    }

    fn find(&self, id: RelationId) -> Result<&RelationState, CoreError> {
        self.state
            .relations
            .iter()
            .find(|r| r.relation.id == id)
            .ok_or(CoreError::RelationNotFound { id })
    }

    fn find_mut(&mut self, id: RelationId) -> Result<&mut RelationState, CoreError> {
        self.state
            .relations
            .iter_mut()
            .find(|r| r.relation.id == id)
            .ok_or(CoreError::RelationNotFound { id })
    }
}

impl UnitModel for LocalUnit {
    fn app_name(&self) -> &str {
        &self.state.app
    }

    fn unit_name(&self) -> &str {
        &self.state.unit
    }

    fn is_leader(&self) -> bool {
        self.state.leader
    }

    fn relation(&self, id: RelationId) -> Option<Relation> {
        self.find(id).ok().map(|r| r.relation.clone())
    }

    fn relations(&self, endpoint: &str) -> Vec<Relation> {
        let mut found: Vec<Relation> = self
            .state
            .relations
            .iter()
            .filter(|r| r.relation.endpoint == endpoint)
            .map(|r| r.relation.clone())
            .collect();
        found.sort_by_key(|r| r.id);
        found
    }

    fn ingress_address(&self, id: RelationId) -> Option<IpAddr> {
        self.find(id).ok().and_then(|r| r.ingress_address)
    }

    fn relation_data(&self, id: RelationId, owner: &str) -> Result<RelationData, CoreError> {
        Ok(self.find(id)?.data.get(owner).cloned().unwrap_or_default())
    }

    fn update_relation_data(
        &mut self,
        id: RelationId,
        owner: &str,
        data: RelationData,
    ) -> Result<(), CoreError> {
        let bucket = self.find_mut(id)?.data.entry(owner.to_owned()).or_default();
        bucket.extend(data);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::model::DNS_PROVIDER;

    #[test]
    fn fresh_unit_has_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let unit = LocalUnit::open(dir.path()).unwrap();
        assert_eq!(unit.app_name(), "coredns");
        assert_eq!(unit.unit_name(), "coredns/0");
        assert!(!unit.is_leader());
        assert_eq!(unit.status().status, UnitStatus::Unknown);
    }

    #[test]
    fn relations_bindings_and_data_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut unit = LocalUnit::open(dir.path()).unwrap();
        let id = unit.add_relation(DNS_PROVIDER, "kubernetes-master", vec!["kubernetes-master/0".into()])
            .unwrap();
        unit.bind(id, Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))).unwrap();
        unit.update_relation_data(id, "coredns", RelationData::from([("port".to_owned(), "53".to_owned())]))
            .unwrap();
        unit.set_leader(true);
        unit.save().unwrap();

        let reopened = LocalUnit::open(dir.path()).unwrap();
        assert!(reopened.is_leader());
        assert_eq!(reopened.relations(DNS_PROVIDER).len(), 1);
        assert_eq!(
            reopened.ingress_address(id),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
        );
        assert_eq!(reopened.relation_data(id, "coredns").unwrap()["port"], "53");
        assert!(reopened.relation_data(id, "kubernetes-master").unwrap().is_empty());
    }

    #[test]
    fn relating_to_own_application_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut unit = LocalUnit::open(dir.path()).unwrap();
        let err = unit
            .add_relation(DNS_PROVIDER, "coredns", vec!["coredns/1".into()])
            .unwrap_err();
        assert!(matches!(err, CoreError::SelfRelation { ref app } if app == "coredns"));
        assert!(unit.all_relations().is_empty());
    }

    #[test]
    fn status_timestamp_only_moves_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut unit = LocalUnit::open(dir.path()).unwrap();
        unit.set_status(UnitStatus::waiting("Waiting to start service"));
        let first = unit.status().clone();
        unit.set_status(UnitStatus::waiting("Waiting to start service"));
        assert_eq!(unit.status(), &first);
    }

    #[test]
    fn unknown_relation_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut unit = LocalUnit::open(dir.path()).unwrap();
        assert!(unit.relation(RelationId(9)).is_none());
        assert!(matches!(
            unit.remove_relation(RelationId(9)),
            Err(CoreError::RelationNotFound { id }) if id == RelationId(9)
        ));
    }
}
