//! `render`: print the Corefile the reconciler would push, or the one the
//! workload currently holds.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use coredns_operator_core::corefile::{self, COREFILE_PATH};
use coredns_operator_core::{Reconciler, Workload};

use crate::cli::{GlobalOpts, OutputFormat, RenderArgs};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Serialize)]
struct RenderedCorefile {
    path: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
}

pub fn handle(
    args: &RenderArgs,
    config: &Config,
    state_dir: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (content, issues) = if args.deployed {
        let session = Session::open(state_dir)?;
        (session.workload.pull(COREFILE_PATH)?, Vec::new())
    } else {
        let issues: Vec<String> = corefile::lint(&config.charm.extra_servers)
            .iter()
            .map(ToString::to_string)
            .collect();
        (Reconciler::new(config.charm.clone()).corefile(), issues)
    };

    if args.check && !issues.is_empty() {
        return Err(CliError::Lint {
            count: issues.len(),
            details: issues.join("\n"),
        });
    }

    let rendered = RenderedCorefile {
        path: COREFILE_PATH,
        content,
        issues,
    };
    match global.output {
        // The Corefile is already text; emit it byte for byte.
        OutputFormat::Table | OutputFormat::Plain => {
            if !global.quiet {
                let mut stdout = io::stdout().lock();
                stdout.write_all(rendered.content.as_bytes())?;
            }
        }
        _ => {
            let out = output::render_single(
                &global.output,
                &rendered,
                |r| r.content.clone(),
                |r| r.content.clone(),
            )?;
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
