use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{read_state, write_state};
use crate::error::CoreError;
use crate::model::{Layer, LayerStack, Plan, ServiceInfo, ServiceStatus, Startup};
use crate::workload::Workload;

pub const WORKLOAD_STATE_FILE: &str = "workload.json";
pub const ROOTFS_DIR: &str = "rootfs";
/// Name reported in connection errors.
pub const CONTAINER_NAME: &str = "coredns";

#[derive(Debug, Serialize, Deserialize)]
struct WorkloadState {
    #[serde(default = "default_reachable")]
    reachable: bool,
    #[serde(default)]
    layers: LayerStack,
    #[serde(default)]
    services: IndexMap<String, ServiceStatus>,
}

impl Default for WorkloadState {
    fn default() -> Self {
        Self {
            reachable: default_reachable(),
            layers: LayerStack::default(),
            services: IndexMap::new(),
        }
    }
}

fn default_reachable() -> bool {
    true
}

/// Workload container simulated inside a state directory.
#[derive(Debug)]
pub struct LocalWorkload {
    dir: PathBuf,
    state: WorkloadState,
}

impl LocalWorkload {
    /// Load the workload from `dir`; a missing state file is a fresh container.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        let state = read_state(&dir.join(WORKLOAD_STATE_FILE))?;
        Ok(Self { dir, state })
    }

    pub fn save(&self) -> Result<(), CoreError> {
        write_state(&self.dir.join(WORKLOAD_STATE_FILE), &self.state)
    }

    /// Simulate the supervisor going away or coming back.
    pub fn set_reachable(&mut self, reachable: bool) {
        self.state.reachable = reachable;
    }

    /// Host path backing a container path.
    pub fn host_path(&self, path: &str) -> Result<PathBuf, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        };
        let relative = Path::new(path)
            .strip_prefix("/")
            .map_err(|_| invalid("must be absolute"))?;
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(invalid("must not contain '..' or '.' components"));
        }
        if relative.as_os_str().is_empty() {
            return Err(invalid("must name a file"));
        }
        Ok(self.dir.join(ROOTFS_DIR).join(relative))
    }

    fn ensure_reachable(&self) -> Result<(), CoreError> {
        if self.state.reachable {
            Ok(())
        } else {
            Err(CoreError::WorkloadUnreachable {
                container: CONTAINER_NAME.into(),
            })
        }
    }

    fn set_service(&mut self, name: &str, status: ServiceStatus) -> Result<(), CoreError> {
        self.ensure_reachable()?;
        if !self.state.layers.plan().services.contains_key(name) {
            return Err(CoreError::ServiceNotFound { name: name.into() });
        }
        self.state.services.insert(name.to_owned(), status);
        debug!(service = name, %status, "service state changed");
        Ok(())
    }
}

impl Workload for LocalWorkload {
    fn can_connect(&self) -> bool {
        self.state.reachable
    }

    fn push(&mut self, path: &str, content: &str, make_dirs: bool) -> Result<(), CoreError> {
        self.ensure_reachable()?;
        let target = self.host_path(path)?;
        if make_dirs {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&target, content)?;
        Ok(())
    }

    fn pull(&self, path: &str) -> Result<String, CoreError> {
        self.ensure_reachable()?;
        let source = self.host_path(path)?;
        fs::read_to_string(&source).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CoreError::FileNotFound { path: path.into() }
            } else {
                e.into()
            }
        })
    }

    fn add_layer(&mut self, label: &str, layer: &Layer, combine: bool) -> Result<(), CoreError> {
        self.ensure_reachable()?;
        self.state.layers.add(label, layer, combine)
    }

    fn plan(&self) -> Result<Plan, CoreError> {
        self.ensure_reachable()?;
        Ok(self.state.layers.plan())
    }

    fn autostart(&mut self) -> Result<(), CoreError> {
        let enabled: Vec<String> = self
            .plan()?
            .services
            .iter()
            .filter(|(_, spec)| spec.startup() == Startup::Enabled)
            .map(|(name, _)| name.clone())
            .collect();
        for name in enabled {
            self.set_service(&name, ServiceStatus::Active)?;
        }
        Ok(())
    }

    fn start(&mut self, service: &str) -> Result<(), CoreError> {
        self.set_service(service, ServiceStatus::Active)
    }

    fn stop(&mut self, service: &str) -> Result<(), CoreError> {
        self.set_service(service, ServiceStatus::Inactive)
    }

    fn service(&self, name: &str) -> Result<Option<ServiceInfo>, CoreError> {
        let plan = self.plan()?;
        Ok(plan.services.get(name).map(|spec| ServiceInfo {
            name: name.to_owned(),
            startup: spec.startup(),
            current: self.state.services.get(name).copied().unwrap_or_default(),
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{LAYER_LABEL, SERVICE_NAME, coredns_layer};

    fn fresh() -> (tempfile::TempDir, LocalWorkload) {
        let dir = tempfile::tempdir().unwrap();
        let workload = LocalWorkload::open(dir.path()).unwrap();
        (dir, workload)
    }

    #[test]
    fn push_with_make_dirs_writes_under_rootfs() {
        let (dir, mut workload) = fresh();
        workload.push("/etc/coredns/Corefile", ".:53 {}\n", true).unwrap();
        let written = fs::read_to_string(dir.path().join("rootfs/etc/coredns/Corefile")).unwrap();
        assert_eq!(written, ".:53 {}\n");
        assert_eq!(workload.pull("/etc/coredns/Corefile").unwrap(), written);
    }

    #[test]
    fn push_without_make_dirs_needs_parent() {
        let (_dir, mut workload) = fresh();
        let err = workload.push("/etc/coredns/Corefile", "", false).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn rejects_relative_and_escaping_paths() {
        let (_dir, workload) = fresh();
        assert!(matches!(
            workload.host_path("etc/Corefile"),
            Err(CoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            workload.host_path("/etc/../../outside"),
            Err(CoreError::InvalidPath { .. })
        ));
    }

    #[test]
    fn services_need_a_plan_entry() {
        let (_dir, mut workload) = fresh();
        assert!(workload.service(SERVICE_NAME).unwrap().is_none());
        assert!(matches!(
            workload.start(SERVICE_NAME),
            Err(CoreError::ServiceNotFound { .. })
        ));

        workload.add_layer(LAYER_LABEL, &coredns_layer(), true).unwrap();
        let info = workload.service(SERVICE_NAME).unwrap().unwrap();
        assert_eq!(info.current, ServiceStatus::Inactive);
        assert_eq!(info.startup, Startup::Enabled);
    }

    #[test]
    fn autostart_starts_enabled_services_and_state_persists() {
        let (dir, mut workload) = fresh();
        workload.add_layer(LAYER_LABEL, &coredns_layer(), true).unwrap();
        workload.autostart().unwrap();
        workload.save().unwrap();

        let reopened = LocalWorkload::open(dir.path()).unwrap();
        assert!(reopened.is_running(SERVICE_NAME));
    }

    #[test]
    fn unreachable_workload_refuses_operations() {
        let (_dir, mut workload) = fresh();
        workload.set_reachable(false);
        assert!(!workload.can_connect());
        assert!(!workload.is_running(SERVICE_NAME));
        assert!(matches!(
            workload.push("/etc/coredns/Corefile", "", true),
            Err(CoreError::WorkloadUnreachable { .. })
        ));
    }
}
