//! In-memory collaborators that record every call.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;

use coredns_operator_core::model::{LayerStack, SERVICE_NAME};
use coredns_operator_core::{
    CoreError, Layer, Plan, Relation, RelationData, RelationId, ServiceInfo, ServiceStatus,
    UnitModel, Workload,
};

pub const APP: &str = "coredns";
pub const CONSUMER: &str = "kubernetes-master";

// ── Workload ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeWorkload {
    pub unreachable: bool,
    /// `None` means the service is not in the plan.
    pub status: Option<ServiceStatus>,
    pub layers: LayerStack,
    pub pushes: Vec<(String, String, bool)>,
    pub layer_calls: Vec<(String, bool)>,
    pub starts: Vec<String>,
    pub stops: Vec<String>,
}

impl FakeWorkload {
    pub fn with_status(status: ServiceStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn active() -> Self {
        Self::with_status(ServiceStatus::Active)
    }

    pub fn inactive() -> Self {
        Self::with_status(ServiceStatus::Inactive)
    }

    fn reachable(&self) -> Result<(), CoreError> {
        if self.unreachable {
            Err(CoreError::WorkloadUnreachable {
                container: "coredns".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl Workload for FakeWorkload {
    fn can_connect(&self) -> bool {
        !self.unreachable
    }

    fn push(&mut self, path: &str, content: &str, make_dirs: bool) -> Result<(), CoreError> {
        self.reachable()?;
        self.pushes.push((path.into(), content.into(), make_dirs));
        Ok(())
    }

    fn pull(&self, path: &str) -> Result<String, CoreError> {
        self.pushes
            .iter()
            .rev()
            .find(|(p, _, _)| p == path)
            .map(|(_, content, _)| content.clone())
            .ok_or_else(|| CoreError::FileNotFound { path: path.into() })
    }

    fn add_layer(&mut self, label: &str, layer: &Layer, combine: bool) -> Result<(), CoreError> {
        self.reachable()?;
        self.layer_calls.push((label.into(), combine));
        self.layers.add(label, layer, combine)
    }

    fn plan(&self) -> Result<Plan, CoreError> {
        Ok(self.layers.plan())
    }

    fn autostart(&mut self) -> Result<(), CoreError> {
        self.start(SERVICE_NAME)
    }

    fn start(&mut self, service: &str) -> Result<(), CoreError> {
        self.reachable()?;
        self.starts.push(service.into());
        self.status = Some(ServiceStatus::Active);
        Ok(())
    }

    fn stop(&mut self, service: &str) -> Result<(), CoreError> {
        self.reachable()?;
        self.stops.push(service.into());
        self.status = Some(ServiceStatus::Inactive);
        Ok(())
    }

    fn service(&self, name: &str) -> Result<Option<ServiceInfo>, CoreError> {
        self.reachable()?;
        if name != SERVICE_NAME {
            return Ok(None);
        }
        Ok(self.status.map(|current| ServiceInfo {
            name: name.into(),
            startup: coredns_operator_core::model::Startup::Enabled,
            current,
        }))
    }
}

// ── Unit model ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeUnit {
    pub leader: bool,
    pub relations: Vec<Relation>,
    pub addresses: HashMap<RelationId, IpAddr>,
    pub data: HashMap<(RelationId, String), RelationData>,
    pub writes: usize,
}

impl FakeUnit {
    pub fn leader() -> Self {
        Self {
            leader: true,
            ..Self::default()
        }
    }

    /// Relate to `kubernetes-master` on `dns-provider`, optionally bound.
    pub fn relate(&mut self, address: Option<&str>) -> RelationId {
        let id = RelationId(u32::try_from(self.relations.len()).unwrap_or(u32::MAX));
        self.relations.push(Relation {
            id,
            endpoint: "dns-provider".into(),
            remote_app: CONSUMER.into(),
            units: vec![format!("{CONSUMER}/0")],
        });
        if let Some(address) = address {
            self.addresses
                .insert(id, address.parse().expect("test address should parse"));
        }
        id
    }

    pub fn app_data(&self, id: RelationId) -> RelationData {
        self.data.get(&(id, APP.to_owned())).cloned().unwrap_or_default()
    }
}

impl UnitModel for FakeUnit {
    fn app_name(&self) -> &str {
        APP
    }

    fn unit_name(&self) -> &str {
        "coredns/0"
    }

    fn is_leader(&self) -> bool {
        self.leader
    }

    fn relation(&self, id: RelationId) -> Option<Relation> {
        self.relations.iter().find(|r| r.id == id).cloned()
    }

    fn relations(&self, endpoint: &str) -> Vec<Relation> {
        self.relations
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .cloned()
            .collect()
    }

    fn ingress_address(&self, id: RelationId) -> Option<IpAddr> {
        self.addresses.get(&id).copied()
    }

    fn relation_data(&self, id: RelationId, owner: &str) -> Result<RelationData, CoreError> {
        Ok(self.data.get(&(id, owner.to_owned())).cloned().unwrap_or_default())
    }

    fn update_relation_data(
        &mut self,
        id: RelationId,
        owner: &str,
        data: RelationData,
    ) -> Result<(), CoreError> {
        self.writes += 1;
        self.data.entry((id, owner.to_owned())).or_default().extend(data);
        Ok(())
    }
}
