use std::sync::Arc;

use anyhow::anyhow;
use rpda_core::{BatchOrchestrator, Direction};
use tracing::info;

use crate::cli::AccessArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_report;

pub(crate) async fn handle_access(
    ctx: &AppContext,
    args: &AccessArgs,
    direction: Direction,
) -> CliResult<()> {
    let intent = args.intent()?;
    let orchestrator = BatchOrchestrator::new(
        Arc::clone(&ctx.gateway),
        ctx.identifiers.clone(),
        ctx.config.orchestrator_config(ctx.check),
    );
    if ctx.check {
        info!("check mode enabled, no changes will be made");
    }

    let result = match &args.group {
        Some(name) => orchestrator.run_one(name, &intent, direction).await,
        None => orchestrator.run_all(&intent, direction).await,
    };
    let report = match result {
        Ok(report) => report,
        Err(err) => {
            if let Some(partial) = err.partial_report() {
                render_report(partial, ctx.output)?;
            }
            return Err(CliError::failure(err));
        }
    };

    render_report(&report, ctx.output)?;

    if report.has_failures() {
        return Err(CliError::failure(anyhow!(
            "{} of {} consistency groups failed",
            report.failed(),
            report.outcomes.len()
        )));
    }
    Ok(())
}
