//! Output renderers for CLI commands.

use anyhow::anyhow;
use rpda_core::{BatchReport, GroupId, GroupStatus};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// One row of the `list` command.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GroupRow {
    pub(crate) id: GroupId,
    pub(crate) name: String,
    pub(crate) administered: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_groups(rows: &[GroupRow], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(rows)?,
        OutputFormat::Table => print!("{}", groups_table(rows)),
    }
    Ok(())
}

pub(crate) fn render_status(groups: &[GroupStatus], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(groups)?,
        OutputFormat::Table => print!("{}", status_table(groups)),
    }
    Ok(())
}

pub(crate) fn render_report(report: &BatchReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Table => print!("{}", report_table(report)),
    }
    Ok(())
}

fn groups_table(rows: &[GroupRow]) -> String {
    let mut out = format!("{:<12} {:<5} NAME\n", "ID", "ADMIN");
    for row in rows {
        let admin = if row.administered { "yes" } else { "no" };
        out.push_str(&format!("{:<12} {:<5} {}\n", row.id.0, admin, row.name));
    }
    out
}

fn status_table(groups: &[GroupStatus]) -> String {
    let mut out = String::new();
    for group in groups {
        out.push_str(&format!("{} (id {})\n", group.name, group.id));
        out.push_str(&format!(
            "  {:<32} {:<10} {:<8} {:<6} {:<14} {:>7} {:>4}\n",
            "COPY", "CLASS", "ROLE", "IMAGE", "MODE", "CLUSTER", "ID"
        ));
        for entry in &group.copies {
            let copy = &entry.copy;
            let image = if copy.image_access_enabled { "on" } else { "off" };
            let mode = copy.image_mode.as_ref().map_or("-", |mode| mode.as_str());
            out.push_str(&format!(
                "  {:<32} {:<10} {:<8} {:<6} {:<14} {:>7} {:>4}\n",
                copy.name,
                entry.class.as_str(),
                copy.role.as_str(),
                image,
                mode,
                copy.address.cluster.0,
                copy.address.copy.0
            ));
        }
    }
    out
}

fn report_table(report: &BatchReport) -> String {
    let mut out = format!("{:<32} {:<32} {:<10} DETAIL\n", "GROUP", "COPY", "STATUS");
    for outcome in &report.outcomes {
        out.push_str(&format!(
            "{:<32} {:<32} {:<10} {}\n",
            outcome.group,
            outcome.copy.as_deref().unwrap_or("-"),
            outcome.status.label(),
            outcome.status.detail()
        ));
    }
    out.push_str(&format!(
        "{} succeeded, {} skipped, {} failed in {:.1}s\n",
        report.succeeded(),
        report.skipped(),
        report.failed(),
        report.elapsed.as_secs_f64()
    ));
    out
}
