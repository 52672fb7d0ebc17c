// ── Domain model ──
//
// Canonical types shared by the reconciler, the collaborator traits and
// the local file-backed implementations.

pub mod layer;
pub mod relation;
pub mod service;
pub mod status;

pub use layer::{
    LAYER_LABEL, LabeledLayer, Layer, LayerStack, Override, Plan, SERVICE_NAME, ServiceSpec,
    Startup, coredns_layer,
};
pub use relation::{
    CLUSTER_DOMAIN, DNS_PORT, DNS_PROVIDER, DnsProviderData, Relation, RelationData, RelationId,
};
pub use service::{ServiceInfo, ServiceStatus};
pub use status::UnitStatus;
