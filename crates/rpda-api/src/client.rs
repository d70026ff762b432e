//! `ApplianceGateway` implementation over the RecoverPoint 5.1 REST API.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use rpda_core::{
    ApplianceGateway, Copy, CopyAddress, GatewayError, GatewayResult, GroupId, MutationStatus,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{GroupSet, GroupSettings, ImageAccessRequest, StringValue, UsersSettings};

/// REST API path appended to the appliance URL.
pub const API_BASE_PATH: &str = "fapi/rest/5_1/";
const HEADER_REQUEST_ID: &str = "x-request-id";

/// Connection settings for [`RecoverPointClient`].
#[derive(Clone)]
pub struct ClientOptions {
    /// Appliance URL, for example `https://rpa01.example.com/`.
    pub base_url: String,
    /// Basic authentication user.
    pub username: String,
    /// Basic authentication password.
    pub password: String,
    /// Verify the appliance certificate.
    pub verify_tls: bool,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Identifier sent as `x-request-id` on every call.
    pub request_id: Uuid,
}

/// REST client for one appliance. Every request carries basic authentication.
#[derive(Debug, Clone)]
pub struct RecoverPointClient {
    http: Client,
    api_root: Url,
    username: String,
}

impl RecoverPointClient {
    /// Build a client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the URL is invalid, a header cannot be encoded, or the
    /// HTTP client cannot be built.
    pub fn new(options: &ClientOptions) -> ApiResult<Self> {
        let api_root = api_root(&options.base_url)?;

        let credentials = general_purpose::STANDARD
            .encode(format!("{}:{}", options.username, options.password));
        let mut authorization = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|_| ApiError::InvalidHeader {
                header: "authorization",
            })?;
        authorization.set_sensitive(true);
        let request_id = HeaderValue::from_str(&options.request_id.to_string()).map_err(|_| {
            ApiError::InvalidHeader {
                header: HEADER_REQUEST_ID,
            }
        })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(AUTHORIZATION, authorization);
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let http = Client::builder()
            .timeout(options.timeout)
            .default_headers(default_headers)
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()
            .map_err(|source| ApiError::Build { source })?;

        Ok(Self {
            http,
            api_root,
            username: options.username.clone(),
        })
    }

    /// Root URL every endpoint is resolved against.
    #[must_use]
    pub const fn api_root(&self) -> &Url {
        &self.api_root
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> GatewayResult<Url> {
        self.api_root
            .join(path)
            .map_err(|err| GatewayError::transport(operation, err))
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> GatewayResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| GatewayError::transport(operation, err))?;
        debug!(operation, status = response.status().as_u16(), "appliance responded");
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> GatewayResult<T> {
        let url = self.endpoint(operation, path)?;
        let response = self.send(operation, self.http.get(url)).await?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| GatewayError::transport(operation, err))?;
        if !status.is_success() {
            return Err(GatewayError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).trim().to_string(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| GatewayError::decode(operation, err))
    }

    async fn put(
        &self,
        operation: &'static str,
        copy: &CopyAddress,
        action: &str,
        body: Option<&ImageAccessRequest>,
    ) -> GatewayResult<MutationStatus> {
        let path = format!(
            "groups/{}/clusters/{}/copies/{}/{action}",
            copy.group.0, copy.cluster.0, copy.copy.0
        );
        let url = self.endpoint(operation, &path)?;
        let mut request = self.http.put(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(operation, request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(MutationStatus::Accepted);
        }
        Ok(MutationStatus::Rejected {
            status: status.as_u16(),
            body: rejection_body(operation, response.text().await),
        })
    }
}

fn rejection_body<E: Display>(operation: &'static str, read: Result<String, E>) -> String {
    match read {
        Ok(body) => body.trim().to_string(),
        Err(err) => {
            debug!(operation, error = %err, "failed to read rejection body");
            format!("<unreadable response body: {err}>")
        }
    }
}

fn api_root(base_url: &str) -> ApiResult<Url> {
    let invalid = |source: url::ParseError| ApiError::InvalidUrl {
        value: base_url.to_string(),
        source,
    };
    let mut base = Url::parse(base_url).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(API_BASE_PATH).map_err(invalid)
}

#[async_trait]
impl ApplianceGateway for RecoverPointClient {
    async fn list_groups(&self) -> GatewayResult<Vec<GroupId>> {
        let set: GroupSet = self.get_json("groups.list", "groups/").await?;
        Ok(set.inner_set.into_iter().map(|group| GroupId(group.id)).collect())
    }

    async fn group_name(&self, group: GroupId) -> GatewayResult<String> {
        let name: StringValue = self
            .get_json("groups.name", &format!("groups/{group}/name/"))
            .await?;
        Ok(name.string)
    }

    async fn group_copies(&self, group: GroupId) -> GatewayResult<Vec<Copy>> {
        let settings: GroupSettings = self
            .get_json("groups.settings", &format!("groups/{group}/settings/"))
            .await?;
        Ok(settings
            .group_copies_settings
            .into_iter()
            .map(Copy::from)
            .collect())
    }

    async fn administered_groups(&self) -> GatewayResult<Vec<GroupId>> {
        let settings: UsersSettings = self.get_json("users.settings", "users/settings/").await?;
        let Some(user) = settings
            .users
            .into_iter()
            .find(|user| user.name == self.username)
        else {
            warn!(user = %self.username, "authenticated user missing from user settings");
            return Ok(Vec::new());
        };
        Ok(user.groups.into_iter().map(|group| GroupId(group.id)).collect())
    }

    async fn set_image_access(
        &self,
        copy: &CopyAddress,
        enable: bool,
    ) -> GatewayResult<MutationStatus> {
        if enable {
            self.put(
                "copies.enable_image_access",
                copy,
                "image_access/latest/enable",
                Some(&ImageAccessRequest::LOGGED_ACCESS),
            )
            .await
        } else {
            self.put("copies.disable_image_access", copy, "disable_image_access", None)
                .await
        }
    }

    async fn set_direct_access(
        &self,
        copy: &CopyAddress,
        enable: bool,
    ) -> GatewayResult<MutationStatus> {
        if enable {
            self.put("copies.enable_direct_access", copy, "enable_direct_access", None)
                .await
        } else {
            self.put("copies.disable_direct_access", copy, "disable_direct_access", None)
                .await
        }
    }

    async fn start_transfer(&self, copy: &CopyAddress) -> GatewayResult<MutationStatus> {
        self.put("copies.start_transfer", copy, "start_transfer", None)
            .await
    }
}
