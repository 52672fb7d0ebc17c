//! Service and plan command handlers.

use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use coredns_operator_core::model::ServiceSpec;
use coredns_operator_core::{ServiceStatus, Workload};

use crate::cli::{GlobalOpts, ServiceArgs, ServiceCommand};
use crate::error::CliError;
use crate::output;

use super::Session;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Service")]
    name: String,
    #[tabled(rename = "Override")]
    override_mode: String,
    #[tabled(rename = "Startup")]
    startup: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Command")]
    command: String,
}

#[derive(Serialize)]
struct PlanEntry {
    name: String,
    #[serde(flatten)]
    spec: ServiceSpec,
    current: Option<ServiceStatus>,
}

/// `plan`: the combined service plan with each service's current state.
pub fn plan(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let workload = &session.workload;
    let entries = workload
        .plan()?
        .services
        .into_iter()
        .map(|(name, spec)| {
            let current = workload.service(&name)?.map(|info| info.current);
            Ok(PlanEntry {
                name,
                spec,
                current,
            })
        })
        .collect::<Result<Vec<_>, CliError>>()?;

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &entries,
        |e| PlanRow {
            name: e.name.clone(),
            override_mode: e.spec.override_mode.to_string(),
            startup: e.spec.startup().to_string(),
            current: output::paint_service(e.current, color),
            command: e.spec.command.clone(),
        },
        |e| e.name.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ServiceArgs, session: &mut Session, global: &GlobalOpts) -> Result<(), CliError> {
    let workload = &mut session.workload;
    match args.command {
        ServiceCommand::Show { name } => {
            let info = workload.service(&name)?.ok_or_else(|| CliError::NotFound {
                resource_type: "service".into(),
                identifier: name.clone(),
                list_command: "plan".into(),
            })?;
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &info,
                |i| {
                    output::detail_lines(&[
                        ("service", i.name.clone()),
                        ("startup", i.startup.to_string()),
                        ("current", output::paint_service(Some(i.current), color)),
                    ])
                },
                |i| i.current.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }

        ServiceCommand::Start { name: Some(name) } => {
            workload.start(&name)?;
            info!(service = %name, "service started");
        }

        ServiceCommand::Start { name: None } => {
            workload.autostart()?;
            info!("enabled services started");
        }

        ServiceCommand::Stop { name } => {
            workload.stop(&name)?;
            info!(service = %name, "service stopped");
        }
    }
    session.save()
}
