use anyhow::anyhow;
use rpda_core::{GatewayError, GroupDirectory, GroupRef};

use crate::cli::StatusArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_status;

fn read_failure(err: GatewayError) -> CliError {
    CliError::failure(anyhow!(err).context("failed to read consistency groups"))
}

pub(crate) async fn handle_status(ctx: &AppContext, args: &StatusArgs) -> CliResult<()> {
    let directory = GroupDirectory::new(ctx.gateway.as_ref());

    let groups: Vec<GroupRef> = if let Some(name) = &args.group {
        let group = directory
            .find_by_name(name)
            .await
            .map_err(read_failure)?
            .ok_or_else(|| CliError::validation(format!("consistency group '{name}' not found")))?;
        vec![group]
    } else if ctx.config.enforce_group_admin {
        directory.authorized().await.map_err(read_failure)?
    } else {
        directory.list().await.map_err(read_failure)?
    };

    let mut statuses = Vec::with_capacity(groups.len());
    for group in &groups {
        statuses.push(
            directory
                .describe(group, &ctx.identifiers)
                .await
                .map_err(read_failure)?,
        );
    }
    render_status(&statuses, ctx.output)
}
