use anyhow::anyhow;
use rpda_core::GroupDirectory;

use crate::client::{AppContext, CliError, CliResult};
use crate::output::{GroupRow, render_groups};

pub(crate) async fn handle_list(ctx: &AppContext) -> CliResult<()> {
    let directory = GroupDirectory::new(ctx.gateway.as_ref());
    let groups = directory.list().await.map_err(|err| {
        CliError::failure(anyhow!(err).context("failed to list consistency groups"))
    })?;
    let administered = directory.administered().await.map_err(|err| {
        CliError::failure(anyhow!(err).context("failed to read administered groups"))
    })?;

    let rows: Vec<GroupRow> = groups
        .into_iter()
        .map(|group| GroupRow {
            administered: administered.contains(&group.id),
            id: group.id,
            name: group.name,
        })
        .collect();
    render_groups(&rows, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{API, context};
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn list_reads_names_and_administration() {
        let server = MockServer::start_async().await;
        let groups = server.mock(|when, then| {
            when.method(GET).path(format!("{API}/groups/"));
            then.status(200)
                .json_body(json!({"innerSet": [{"id": 10}, {"id": 11}]}));
        });
        let first = server.mock(|when, then| {
            when.method(GET).path(format!("{API}/groups/10/name/"));
            then.status(200).json_body(json!({"string": "Test1_CG"}));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path(format!("{API}/groups/11/name/"));
            then.status(200).json_body(json!({"string": "Test2_CG"}));
        });
        let users = server.mock(|when, then| {
            when.method(GET).path(format!("{API}/users/settings/"));
            then.status(200)
                .json_body(json!({"users": [{"name": "admin", "groups": [{"id": 11}]}]}));
        });

        handle_list(&context(&server, false))
            .await
            .expect("list succeeds");

        groups.assert();
        first.assert();
        second.assert();
        users.assert();
    }

    #[tokio::test]
    async fn list_failure_is_operational() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(format!("{API}/groups/"));
            then.status(500).body("boom");
        });

        let err = handle_list(&context(&server, false))
            .await
            .expect_err("500 must fail");
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("failed to list"));
    }
}
