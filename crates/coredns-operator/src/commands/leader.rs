//! `leader`: show or change whether this unit holds leadership.

use serde::Serialize;
use tracing::info;

use coredns_operator_core::UnitModel;

use crate::cli::{GlobalOpts, LeaderArgs};
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Serialize)]
struct Leadership<'a> {
    unit: &'a str,
    leader: bool,
}

pub fn handle(args: &LeaderArgs, session: &mut Session, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(leader) = args.leader {
        session.unit.set_leader(leader);
        session.save()?;
        info!(leader, "leadership changed; dispatch leader-elected to republish");
    }

    let view = Leadership {
        unit: session.unit.unit_name(),
        leader: session.unit.is_leader(),
    };
    let out = output::render_single(
        &global.output,
        &view,
        |v| output::detail_lines(&[("unit", v.unit.to_owned()), ("leader", v.leader.to_string())]),
        |v| v.leader.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
