use std::time::Duration;

use anyhow::Result;
use httpmock::Method::PUT;
use httpmock::prelude::*;
use rpda_api::{ClientOptions, RecoverPointClient};
use rpda_core::{
    ApplianceGateway, ClusterId, CopyAddress, CopyId, CopyRole, GatewayError, GroupId,
    MutationStatus,
};
use serde_json::json;
use uuid::Uuid;

// "admin:secret"
const BASIC_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

fn client(server: &MockServer, request_id: Uuid) -> Result<RecoverPointClient> {
    Ok(RecoverPointClient::new(&ClientOptions {
        base_url: server.base_url(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        verify_tls: true,
        timeout: Duration::from_secs(5),
        request_id,
    })?)
}

fn address() -> CopyAddress {
    CopyAddress {
        group: GroupId(4242),
        cluster: ClusterId(9001),
        copy: CopyId(2),
    }
}

#[tokio::test]
async fn list_groups_sends_auth_and_request_id() -> Result<()> {
    let server = MockServer::start_async().await;
    let request_id = Uuid::new_v4();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/fapi/rest/5_1/groups/")
            .header("authorization", BASIC_AUTH)
            .header("x-request-id", request_id.to_string());
        then.status(200)
            .json_body(json!({"innerSet": [{"id": 4242}, {"id": 77}]}));
    });

    let groups = client(&server, request_id)?.list_groups().await?;

    mock.assert();
    assert_eq!(groups, vec![GroupId(4242), GroupId(77)]);
    Ok(())
}

#[tokio::test]
async fn group_name_and_copies_are_decoded() -> Result<()> {
    let server = MockServer::start_async().await;
    let name = server.mock(|when, then| {
        when.method(GET).path("/fapi/rest/5_1/groups/4242/name/");
        then.status(200).json_body(json!({"string": "Test1_CG"}));
    });
    let settings = server.mock(|when, then| {
        when.method(GET).path("/fapi/rest/5_1/groups/4242/settings/");
        then.status(200).json_body(json!({
            "groupCopiesSettings": [
                {
                    "name": "Test1_CG_PN",
                    "copyUID": {
                        "groupUID": {"id": 4242},
                        "globalCopyUID": {"copyUID": 0, "clusterUID": {"id": 8001}}
                    },
                    "roleInfo": {"role": "ACTIVE"}
                },
                {
                    "name": "TC_Test1_CG",
                    "copyUID": {
                        "groupUID": {"id": 4242},
                        "globalCopyUID": {"copyUID": 2, "clusterUID": {"id": 9001}}
                    },
                    "roleInfo": {"role": "REPLICA"},
                    "imageAccessInformation": {"imageAccessEnabled": false}
                }
            ]
        }));
    });

    let client = client(&server, Uuid::new_v4())?;
    assert_eq!(client.group_name(GroupId(4242)).await?, "Test1_CG");
    let copies = client.group_copies(GroupId(4242)).await?;

    name.assert();
    settings.assert();
    assert_eq!(copies.len(), 2);
    assert_eq!(copies[0].role, CopyRole::Active);
    assert_eq!(copies[1].address, address());
    Ok(())
}

#[tokio::test]
async fn administered_groups_come_from_matching_user() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET).path("/fapi/rest/5_1/users/settings/");
        then.status(200).json_body(json!({
            "users": [
                {"name": "operator", "groups": [{"id": 1}]},
                {"name": "admin", "groups": [{"id": 4242}, {"id": 77}]}
            ]
        }));
    });

    let groups = client(&server, Uuid::new_v4())?
        .administered_groups()
        .await?;

    mock.assert();
    assert_eq!(groups, vec![GroupId(4242), GroupId(77)]);
    Ok(())
}

#[tokio::test]
async fn enable_image_access_posts_logged_access_body() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/fapi/rest/5_1/groups/4242/clusters/9001/copies/2/image_access/latest/enable")
            .json_body(json!({"mode": "LOGGED_ACCESS", "scenario": "UNKNOWN"}));
        then.status(204);
    });

    let status = client(&server, Uuid::new_v4())?
        .set_image_access(&address(), true)
        .await?;

    mock.assert();
    assert_eq!(status, MutationStatus::Accepted);
    Ok(())
}

#[tokio::test]
async fn mutation_endpoints_follow_copy_address() -> Result<()> {
    let server = MockServer::start_async().await;
    let base = "/fapi/rest/5_1/groups/4242/clusters/9001/copies/2";
    let disable = server.mock(|when, then| {
        when.method(PUT).path(format!("{base}/disable_image_access"));
        then.status(204);
    });
    let direct = server.mock(|when, then| {
        when.method(PUT).path(format!("{base}/enable_direct_access"));
        then.status(204);
    });
    let transfer = server.mock(|when, then| {
        when.method(PUT).path(format!("{base}/start_transfer"));
        then.status(204);
    });

    let client = client(&server, Uuid::new_v4())?;
    assert!(client.set_image_access(&address(), false).await?.is_accepted());
    assert!(client.set_direct_access(&address(), true).await?.is_accepted());
    assert!(client.start_transfer(&address()).await?.is_accepted());

    disable.assert();
    direct.assert();
    transfer.assert();
    Ok(())
}

#[tokio::test]
async fn rejected_mutation_carries_status_and_body() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/fapi/rest/5_1/groups/4242/clusters/9001/copies/2/enable_direct_access");
        then.status(400).body("image access is not enabled");
    });

    let status = client(&server, Uuid::new_v4())?
        .set_direct_access(&address(), true)
        .await?;

    mock.assert();
    assert_eq!(
        status,
        MutationStatus::Rejected {
            status: 400,
            body: "image access is not enabled".to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn read_failures_map_to_gateway_errors() -> Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/fapi/rest/5_1/groups/");
        then.status(401).body("unauthorized");
    });
    server.mock(|when, then| {
        when.method(GET).path("/fapi/rest/5_1/groups/1/name/");
        then.status(200).body("not json");
    });

    let client = client(&server, Uuid::new_v4())?;
    let err = client.list_groups().await.expect_err("401 must fail");
    assert!(matches!(
        err,
        GatewayError::UnexpectedStatus {
            status: 401,
            operation: "groups.list",
            ..
        }
    ));
    let err = client
        .group_name(GroupId(1))
        .await
        .expect_err("garbage body must fail");
    assert!(matches!(err, GatewayError::Decode { .. }));
    Ok(())
}

#[tokio::test]
async fn unreachable_appliance_is_a_transport_error() -> Result<()> {
    let client = RecoverPointClient::new(&ClientOptions {
        base_url: "http://127.0.0.1:9/".to_string(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        verify_tls: false,
        timeout: Duration::from_secs(2),
        request_id: Uuid::new_v4(),
    })?;

    let err = client.list_groups().await.expect_err("nothing listens on port 9");
    assert!(err.is_transport());
    Ok(())
}
