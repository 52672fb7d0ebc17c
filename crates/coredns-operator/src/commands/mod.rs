//! Command dispatch: bridges CLI args -> local state -> output formatting.

pub mod config_cmd;
pub mod dispatch;
pub mod leader;
pub mod relation;
pub mod render;
pub mod service;
pub mod status;
pub mod workload;

use std::path::{Path, PathBuf};

use tracing::debug;

use coredns_operator_core::{LocalUnit, LocalWorkload, RelationId};

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Workload and unit loaded from one state directory.
pub struct Session {
    pub dir: PathBuf,
    pub workload: LocalWorkload,
    pub unit: LocalUnit,
}

impl Session {
    pub fn open(dir: &Path) -> Result<Self, CliError> {
        debug!(dir = %dir.display(), "opening state");
        Ok(Self {
            dir: dir.to_path_buf(),
            workload: LocalWorkload::open(dir)?,
            unit: LocalUnit::open(dir)?,
        })
    }

    pub fn save(&self) -> Result<(), CliError> {
        self.workload.save()?;
        self.unit.save()?;
        Ok(())
    }
}

/// Parse a relation id given as `3` or `dns-provider:3`.
pub fn parse_relation_id(raw: &str) -> Result<RelationId, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "relation id".into(),
        reason: format!("expected a number or <endpoint>:<number>, got '{raw}'"),
    })
}

/// Dispatch a state-bound command to the appropriate handler.
pub fn dispatch(
    cmd: Command,
    config: &Config,
    state_dir: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Command::Render(args) = cmd {
        return render::handle(&args, config, state_dir, global);
    }

    let mut session = Session::open(state_dir)?;
    match cmd {
        Command::Dispatch(args) => dispatch::handle(&args, config, &mut session, global),
        Command::Status => status::handle(&session, global),
        Command::Plan => service::plan(&session, global),
        Command::Relation(args) => relation::handle(args, &mut session, global),
        Command::Leader(args) => leader::handle(&args, &mut session, global),
        Command::Service(args) => service::handle(args, &mut session, global),
        Command::Workload(args) => workload::handle(&args, &mut session, global),
        // Render, Config and Completions are handled before dispatch
        Command::Render(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn relation_ids_accept_endpoint_prefix() {
        assert_eq!(parse_relation_id("4").unwrap(), RelationId(4));
        assert_eq!(parse_relation_id("dns-provider:4").unwrap(), RelationId(4));
        assert!(parse_relation_id("dns-provider").is_err());
    }
}
