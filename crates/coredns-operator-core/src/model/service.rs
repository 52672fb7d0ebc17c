use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::layer::Startup;

/// Current state of a supervised service.
///
/// A service missing from the plan has no status at all; callers see that
/// as `None` from `Workload::service`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Active,
    #[default]
    Inactive,
    Backoff,
    Error,
}

/// Snapshot of a single service as reported by the workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub startup: Startup,
    pub current: ServiceStatus,
}

impl ServiceInfo {
    pub fn is_running(&self) -> bool {
        self.current == ServiceStatus::Active
    }
}
