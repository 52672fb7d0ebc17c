//! `status`: unit status, leadership and workload state at a glance.

use chrono::{DateTime, Utc};
use serde::Serialize;

use coredns_operator_core::model::SERVICE_NAME;
use coredns_operator_core::{ServiceStatus, UnitModel, UnitStatus, Workload};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Serialize)]
struct StatusView {
    app: String,
    unit: String,
    leader: bool,
    status: UnitStatus,
    since: DateTime<Utc>,
    workload_reachable: bool,
    service: Option<ServiceStatus>,
    relations: usize,
}

fn collect(session: &Session) -> StatusView {
    let unit = &session.unit;
    let workload = &session.workload;
    let record = unit.status();
    // An unreachable supervisor reports no service rather than an error.
    let service = workload
        .service(SERVICE_NAME)
        .ok()
        .flatten()
        .map(|info| info.current);

    StatusView {
        app: unit.app_name().to_owned(),
        unit: unit.unit_name().to_owned(),
        leader: unit.is_leader(),
        status: record.status.clone(),
        since: record.since,
        workload_reachable: workload.can_connect(),
        service,
        relations: unit.all_relations().len(),
    }
}

pub fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let view = collect(session);
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| {
            output::detail_lines(&[
                ("unit", v.unit.clone()),
                ("status", output::paint_status(&v.status, color)),
                ("since", v.since.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
                ("leader", v.leader.to_string()),
                (
                    "workload",
                    if v.workload_reachable {
                        "connected".into()
                    } else {
                        "unreachable".into()
                    },
                ),
                ("service", output::paint_service(v.service, color)),
                ("relations", v.relations.to_string()),
            ])
        },
        |v| v.status.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
