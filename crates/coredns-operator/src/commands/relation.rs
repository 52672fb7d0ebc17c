//! Relation command handlers.

use std::net::IpAddr;

use indexmap::IndexMap;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use coredns_operator_core::{CoreError, Relation, RelationData, RelationId, UnitModel};

use crate::cli::{GlobalOpts, RelationArgs, RelationCommand};
use crate::error::CliError;
use crate::output;

use super::{Session, parse_relation_id};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RelationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Remote App")]
    remote_app: String,
    #[tabled(rename = "Units")]
    units: String,
    #[tabled(rename = "Ingress")]
    ingress: String,
}

/// A relation with everything the unit knows about it.
#[derive(Serialize)]
struct RelationView {
    #[serde(flatten)]
    relation: Relation,
    ingress_address: Option<IpAddr>,
    data: IndexMap<String, RelationData>,
}

impl From<&RelationView> for RelationRow {
    fn from(v: &RelationView) -> Self {
        Self {
            id: v.relation.id.to_string(),
            endpoint: v.relation.endpoint.clone(),
            remote_app: v.relation.remote_app.clone(),
            units: v.relation.units.join(", "),
            ingress: v
                .ingress_address
                .map_or_else(|| "-".into(), |a| a.to_string()),
        }
    }
}

fn view(session: &Session, id: RelationId) -> Result<RelationView, CliError> {
    let unit = &session.unit;
    let relation = unit
        .relation(id)
        .ok_or(CoreError::RelationNotFound { id })?;
    Ok(RelationView {
        ingress_address: unit.ingress_address(id),
        data: unit.buckets(id)?.clone(),
        relation,
    })
}

fn detail(v: &RelationView) -> String {
    let mut out = output::detail_lines(&[
        ("relation", format!("{}:{}", v.relation.endpoint, v.relation.id)),
        ("remote app", v.relation.remote_app.clone()),
        ("units", v.relation.units.join(", ")),
        (
            "ingress",
            v.ingress_address
                .map_or_else(|| "(unbound)".into(), |a| a.to_string()),
        ),
    ]);
    for (owner, data) in &v.data {
        out.push_str(&format!("\n\n[{owner}]"));
        if data.is_empty() {
            out.push_str("\n  (empty)");
        }
        for (key, value) in data {
            out.push_str(&format!("\n  {key}: {value}"));
        }
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    args: RelationArgs,
    session: &mut Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RelationCommand::List => {
            let views = session
                .unit
                .all_relations()
                .into_iter()
                .map(|r| view(session, r.id))
                .collect::<Result<Vec<_>, _>>()?;
            let out = output::render_list(
                &global.output,
                &views,
                |v| RelationRow::from(v),
                |v| format!("{}:{}", v.relation.endpoint, v.relation.id),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RelationCommand::Add {
            remote_app,
            endpoint,
            units,
        } => {
            let units = if units.is_empty() {
                vec![format!("{remote_app}/0")]
            } else {
                units
            };
            let id = session.unit.add_relation(&endpoint, &remote_app, units)?;
            session.save()?;
            info!(%id, %endpoint, %remote_app, "relation added");

            let v = view(session, id)?;
            let out = output::render_single(&global.output, &v, detail, |v| {
                v.relation.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RelationCommand::Remove { id } => {
            let id = parse_relation_id(&id)?;
            let removed = session.unit.remove_relation(id)?;
            session.save()?;
            info!(%id, remote_app = %removed.remote_app, "relation removed");
            if !global.quiet {
                eprintln!("Removed relation {}:{id}", removed.endpoint);
            }
            Ok(())
        }

        RelationCommand::Show { id } => {
            let v = view(session, parse_relation_id(&id)?)?;
            let out = output::render_single(&global.output, &v, detail, |v| {
                v.relation.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RelationCommand::Bind { id, address } => {
            let id = parse_relation_id(&id)?;
            session.unit.bind(id, Some(address))?;
            session.save()?;
            info!(%id, %address, "ingress address bound");
            Ok(())
        }

        RelationCommand::Unbind { id } => {
            let id = parse_relation_id(&id)?;
            session.unit.bind(id, None)?;
            session.save()?;
            info!(%id, "ingress address cleared");
            Ok(())
        }
    }
}
