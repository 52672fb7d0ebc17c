// ── Unit model seam ──
//
// Leadership, relations and their data buckets, and network bindings.
// Buckets are scoped by relation id and owner (an application or unit
// name), so the reconciler stays a function of its inputs plus this trait.

use std::net::IpAddr;

use crate::error::CoreError;
use crate::model::{Relation, RelationData, RelationId};

pub trait UnitModel {
    /// Name of the application this unit belongs to.
    fn app_name(&self) -> &str;

    fn unit_name(&self) -> &str;

    fn is_leader(&self) -> bool;

    fn relation(&self, id: RelationId) -> Option<Relation>;

    /// All relations established on `endpoint`, in id order.
    fn relations(&self, endpoint: &str) -> Vec<Relation>;

    /// Ingress address of this unit on the relation's binding, if assigned.
    fn ingress_address(&self, id: RelationId) -> Option<IpAddr>;

    fn relation_data(&self, id: RelationId, owner: &str) -> Result<RelationData, CoreError>;

    /// Merge `data` into the bucket owned by `owner`.
    fn update_relation_data(
        &mut self,
        id: RelationId,
        owner: &str,
        data: RelationData,
    ) -> Result<(), CoreError>;
}
