// ── Workload container seam ──
//
// Everything the reconciler needs from the container that runs CoreDNS.
// Implementations own transport and supervision; the reconciler only
// reads service state and issues pushes, layers and starts.

use crate::error::CoreError;
use crate::model::{Layer, Plan, ServiceInfo};

/// Handle on the workload container.
pub trait Workload {
    /// Whether the container's supervisor is reachable.
    fn can_connect(&self) -> bool;

    /// Write `content` to `path`, creating parent directories when `make_dirs`.
    fn push(&mut self, path: &str, content: &str, make_dirs: bool) -> Result<(), CoreError>;

    /// Read back a file previously written to the container.
    fn pull(&self, path: &str) -> Result<String, CoreError>;

    fn add_layer(&mut self, label: &str, layer: &Layer, combine: bool) -> Result<(), CoreError>;

    fn plan(&self) -> Result<Plan, CoreError>;

    /// Start every service whose startup is `enabled`.
    fn autostart(&mut self) -> Result<(), CoreError>;

    fn start(&mut self, service: &str) -> Result<(), CoreError>;

    fn stop(&mut self, service: &str) -> Result<(), CoreError>;

    /// Look up a service. `None` when the plan does not define it.
    fn service(&self, name: &str) -> Result<Option<ServiceInfo>, CoreError>;

    /// True only when the container is reachable and `name` is active.
    fn is_running(&self, name: &str) -> bool {
        if !self.can_connect() {
            return false;
        }
        matches!(self.service(name), Ok(Some(info)) if info.is_running())
    }
}
