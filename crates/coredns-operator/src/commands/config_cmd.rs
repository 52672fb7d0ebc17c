//! Config subcommand handlers.

use tracing::info;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Human view of the config: the TOML that would be saved, plus where
/// state lives once flags are applied.
fn format_config(cfg: &Config, global: &GlobalOpts) -> Result<String, CliError> {
    let body = toml::to_string_pretty(cfg).map_err(|e| CliError::Render(e.to_string()))?;
    let state_dir = config::state_dir(global, cfg);
    Ok(format!(
        "# file: {}\n# state: {}\n{}",
        config::config_path(global).display(),
        state_dir.display(),
        body.trim_end()
    ))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let table = format_config(&cfg, global)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| table.clone(),
                |c| c.charm.forward.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set {
            key,
            value,
            from_file,
        } => {
            let value = match (value, from_file) {
                (Some(value), _) => value,
                (None, Some(path)) => std::fs::read_to_string(&path)?,
                (None, None) => {
                    return Err(CliError::Validation {
                        field: key,
                        reason: "a value or --from-file is required".into(),
                    });
                }
            };

            let path = config::config_path(global);
            let mut cfg = config::load_file_config(&path)?;
            cfg.set(&key, &value)?;
            config::save_config_to(&cfg, &path)?;
            info!(%key, path = %path.display(), "config updated");
            if !global.quiet {
                eprintln!("Set {key} in {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
            Ok(())
        }
    }
}
