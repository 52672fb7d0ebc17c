// ── Operator configuration ──
//
// The values an operator of the charm can set. Loading from disk and the
// environment lives in `coredns-operator-config`; core only consumes the
// resolved struct.

use serde::{Deserialize, Serialize};

/// Resolver used when `forward` is not configured.
pub const DEFAULT_FORWARD: &str = "1.1.1.1";

/// Charm configuration consumed by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharmConfig {
    /// Upstream resolver for the `forward .` directive. Not validated.
    #[serde(default = "default_forward")]
    pub forward: String,

    /// Additional server blocks appended verbatim to the Corefile.
    #[serde(default)]
    pub extra_servers: String,
}

impl Default for CharmConfig {
    fn default() -> Self {
        Self {
            forward: default_forward(),
            extra_servers: String::new(),
        }
    }
}

fn default_forward() -> String {
    DEFAULT_FORWARD.into()
}
