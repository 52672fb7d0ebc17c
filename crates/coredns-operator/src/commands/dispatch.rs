//! Event dispatch: run one lifecycle event through the reconciler and
//! persist the resulting state.

use serde::Serialize;
use tracing::info;

use coredns_operator_core::{
    Action, Context, Dispatcher, Event, EventName, Reconciler, Reconciliation, UnitStatus,
};

use crate::cli::{DispatchArgs, EventArg, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::{Session, parse_relation_id};

impl From<EventArg> for EventName {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Install => Self::Install,
            EventArg::CorednsPebbleReady => Self::CorednsPebbleReady,
            EventArg::ConfigChanged => Self::ConfigChanged,
            EventArg::LeaderElected => Self::LeaderElected,
            EventArg::DnsProviderRelationChanged => Self::DnsProviderRelationChanged,
        }
    }
}

/// What `dispatch` reports: the reconciliation plus the status now in effect.
#[derive(Serialize)]
struct DispatchReport<'a> {
    #[serde(flatten)]
    outcome: &'a Reconciliation,
    unit_status: &'a UnitStatus,
}

fn describe(action: &Action) -> String {
    match action {
        Action::Pushed { path, bytes } => format!("pushed {path} ({bytes} bytes)"),
        Action::LayerAdded { label } => format!("added layer '{label}'"),
        Action::Started { service } => format!("started {service}"),
        Action::Published { relation, data } => {
            let pairs: Vec<String> = data.iter().map(|(k, v)| format!("{k}={v}")).collect();
            format!("published to relation {relation}: {}", pairs.join(", "))
        }
    }
}

pub fn handle(
    args: &DispatchArgs,
    config: &Config,
    session: &mut Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let name = EventName::from(args.event);
    let relation = args.relation.as_deref().map(parse_relation_id).transpose()?;
    if relation.is_some() && !name.is_relation_event() {
        return Err(CliError::Validation {
            field: "--relation".into(),
            reason: format!("event '{name}' is not a relation event"),
        });
    }
    let event = Event { name, relation };

    let reconciler = Reconciler::new(config.charm.clone());
    let outcome = {
        let mut ctx = Context {
            workload: &mut session.workload,
            unit: &mut session.unit,
        };
        Dispatcher::standard().dispatch(&reconciler, &mut ctx, &event)?
    };

    if let Some(ref status) = outcome.status {
        session.unit.set_status(status.clone());
    }
    session.save()?;
    info!(event = %name, actions = outcome.actions.len(), "event reconciled");

    let color = output::should_color(&global.color);
    let report = DispatchReport {
        outcome: &outcome,
        unit_status: &session.unit.status().status,
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let mut pairs = vec![
                ("event", r.outcome.event.to_string()),
                (
                    "status",
                    match r.outcome.status {
                        Some(ref s) => output::paint_status(s, color),
                        None => format!("unchanged ({})", output::paint_status(r.unit_status, color)),
                    },
                ),
            ];
            if let Some(reason) = r.outcome.skipped {
                pairs.push(("skipped", reason.to_string()));
            }
            for action in &r.outcome.actions {
                pairs.push(("action", describe(action)));
            }
            output::detail_lines(&pairs)
        },
        |r| r.unit_status.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
