// ── Local file-backed collaborators ──
//
// A state directory stands in for the container and the unit model:
//
//   <state>/workload.json   layers, service states, reachability
//   <state>/rootfs/...      files pushed into the "container"
//   <state>/unit.json       leadership, status, relations and bindings
//
// Service state is simulated; no process is spawned.

mod unit;
mod workload;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CoreError;

pub use unit::{LocalUnit, StatusRecord, UNIT_STATE_FILE};
pub use workload::{CONTAINER_NAME, LocalWorkload, ROOTFS_DIR, WORKLOAD_STATE_FILE};

/// Read a JSON state file, falling back to `T::default()` when absent.
fn read_state<T: DeserializeOwned + Default>(path: &Path) -> Result<T, CoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&raw).map_err(|source| CoreError::State {
        path: path.to_path_buf(),
        source,
    })
}

fn write_state<T: Serialize>(path: &Path, state: &T) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(state).map_err(|source| CoreError::State {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, raw)?;
    Ok(())
}
