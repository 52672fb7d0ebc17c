//! `workload connect|disconnect`: simulate the supervisor's availability.

use tracing::info;

use crate::cli::{GlobalOpts, WorkloadArgs, WorkloadCommand};
use crate::error::CliError;

use super::Session;

pub fn handle(args: &WorkloadArgs, session: &mut Session, global: &GlobalOpts) -> Result<(), CliError> {
    let reachable = matches!(args.command, WorkloadCommand::Connect);
    session.workload.set_reachable(reachable);
    session.save()?;
    info!(reachable, "workload reachability changed");
    if !global.quiet {
        eprintln!(
            "Workload {}",
            if reachable { "connected" } else { "disconnected" }
        );
    }
    Ok(())
}
