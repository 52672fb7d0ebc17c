//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use coredns_operator_core::{ServiceStatus, UnitStatus};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Unit status as `name: message`, colored by severity.
pub fn paint_status(status: &UnitStatus, color: bool) -> String {
    let text = status.to_string();
    if !color {
        return text;
    }
    match status {
        UnitStatus::Active(_) => text.green().to_string(),
        UnitStatus::Waiting(_) | UnitStatus::Maintenance(_) => text.yellow().to_string(),
        UnitStatus::Blocked(_) => text.red().to_string(),
        UnitStatus::Unknown => text.dimmed().to_string(),
    }
}

pub fn paint_service(status: Option<ServiceStatus>, color: bool) -> String {
    let Some(status) = status else {
        return if color {
            "absent".dimmed().to_string()
        } else {
            "absent".into()
        };
    };
    let text = status.to_string();
    if !color {
        return text;
    }
    match status {
        ServiceStatus::Active => text.green().to_string(),
        ServiceStatus::Inactive => text.yellow().to_string(),
        ServiceStatus::Backoff | ServiceStatus::Error => text.red().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// `key: value` lines with the keys padded to a common width.
pub fn detail_lines(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(k, v)| format!("{k:<width$}  {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    // serde_yaml terminates documents with a newline; print_output adds its own.
    Ok(serde_yaml::to_string(data)?.trim_end().to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plain_status_has_no_escape_codes() {
        let status = UnitStatus::active("CoreDNS started");
        assert_eq!(paint_status(&status, false), "active: CoreDNS started");
        assert!(paint_status(&status, true).contains("\u{1b}["));
        assert_eq!(paint_service(None, false), "absent");
    }

    #[test]
    fn detail_lines_align_keys() {
        let out = detail_lines(&[("status", "active".into()), ("leader", "true".into())]);
        assert_eq!(out, "status  active\nleader  true");
    }

    #[test]
    fn single_item_formats() {
        let data = vec![("a", 1)];
        assert_eq!(
            render_single(&OutputFormat::JsonCompact, &data, |_| String::new(), |_| "a".into())
                .unwrap(),
            r#"[["a",1]]"#
        );
        assert_eq!(
            render_single(&OutputFormat::Plain, &data, |_| String::new(), |_| "a".into()).unwrap(),
            "a"
        );
    }
}
