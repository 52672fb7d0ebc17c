use std::fmt;

use serde::{Deserialize, Serialize};

/// Message shown while a non-leader unit waits.
pub const WAITING_FOR_LEADERSHIP: &str = "Waiting for leadership";
/// Message shown before the workload service has been started.
pub const WAITING_TO_START: &str = "Waiting to start service";
/// Message shown once CoreDNS runs but nothing consumes it yet.
pub const AWAITING_RELATION: &str = "Awaiting dns-provider relation";
/// Message shown when the service is expected but not active.
pub const NOT_RUNNING: &str = "CoreDNS is not running";
/// Message shown once relation data has been published.
pub const STARTED: &str = "CoreDNS started";

/// Unit status as reported to the operator.
///
/// Exactly one is authoritative at a time. Reconciliation returns a new
/// value and the caller persists it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum UnitStatus {
    #[default]
    Unknown,
    Active(String),
    Waiting(String),
    Maintenance(String),
    Blocked(String),
}

impl UnitStatus {
    pub fn active(message: impl Into<String>) -> Self {
        Self::Active(message.into())
    }

    pub fn waiting(message: impl Into<String>) -> Self {
        Self::Waiting(message.into())
    }

    pub fn maintenance(message: impl Into<String>) -> Self {
        Self::Maintenance(message.into())
    }

    /// Lowercase status name (`active`, `waiting`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Active(_) => "active",
            Self::Waiting(_) => "waiting",
            Self::Maintenance(_) => "maintenance",
            Self::Blocked(_) => "blocked",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Unknown => "",
            Self::Active(m) | Self::Waiting(m) | Self::Maintenance(m) | Self::Blocked(m) => m,
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        if message.is_empty() {
            f.write_str(self.name())
        } else {
            write!(f, "{}: {message}", self.name())
        }
    }
}
