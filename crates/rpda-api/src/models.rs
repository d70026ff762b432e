//! Wire payloads returned by the RecoverPoint REST API.

use rpda_core::{ClusterId, Copy, CopyAddress, CopyId, CopyRole, GroupId, ImageMode};
use serde::{Deserialize, Serialize};

/// `groups/` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSet {
    /// Group identifiers.
    #[serde(default)]
    pub inner_set: Vec<IdRef>,
}

/// `{"id": N}` reference used for groups and clusters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdRef {
    /// Identifier.
    pub id: u64,
}

/// `{"string": "..."}` wrapper used by the name endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StringValue {
    /// Wrapped value.
    pub string: String,
}

/// `groups/{id}/settings/` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSettings {
    /// Per-copy settings in appliance order.
    #[serde(default)]
    pub group_copies_settings: Vec<CopySettings>,
}

/// Settings of one copy.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopySettings {
    /// Copy display name.
    pub name: String,
    /// Copy identifiers.
    #[serde(rename = "copyUID")]
    pub copy_uid: CopyUid,
    /// Replication role.
    pub role_info: RoleInfo,
    /// Image access state; absent on copies that never had image access.
    #[serde(default)]
    pub image_access_information: Option<ImageAccessInformation>,
}

/// Copy identifier block.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CopyUid {
    /// Owning group.
    #[serde(rename = "groupUID")]
    pub group_uid: IdRef,
    /// Cluster-qualified copy identifier.
    #[serde(rename = "globalCopyUID")]
    pub global_copy_uid: GlobalCopyUid,
}

/// Cluster-qualified copy identifier.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GlobalCopyUid {
    /// Copy identifier.
    #[serde(rename = "copyUID")]
    pub copy_uid: u64,
    /// Hosting cluster.
    #[serde(rename = "clusterUID")]
    pub cluster_uid: IdRef,
}

/// Replication role block.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleInfo {
    /// Role string such as `ACTIVE` or `REPLICA`.
    pub role: String,
}

/// Image access block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAccessInformation {
    /// Whether image access is enabled.
    #[serde(default)]
    pub image_access_enabled: bool,
    /// Accessed image details.
    #[serde(default)]
    pub image_information: Option<ImageInformation>,
}

/// Accessed image details.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageInformation {
    /// Image mode string such as `LOGGED_ACCESS`.
    #[serde(default)]
    pub mode: Option<String>,
}

/// `users/settings/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersSettings {
    /// Configured users.
    #[serde(default)]
    pub users: Vec<UserSettings>,
}

/// One configured user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSettings {
    /// Login name.
    pub name: String,
    /// Groups the user administers.
    #[serde(default)]
    pub groups: Vec<IdRef>,
}

/// Body of the enable-latest-image-access request.
#[derive(Debug, Clone, Serialize)]
pub struct ImageAccessRequest {
    /// Requested access mode.
    pub mode: &'static str,
    /// Access scenario.
    pub scenario: &'static str,
}

impl ImageAccessRequest {
    /// Logged access with an unspecified scenario.
    pub const LOGGED_ACCESS: Self = Self {
        mode: "LOGGED_ACCESS",
        scenario: "UNKNOWN",
    };
}

impl From<CopySettings> for Copy {
    fn from(settings: CopySettings) -> Self {
        let access = settings.image_access_information;
        Self {
            name: settings.name,
            role: CopyRole::parse(&settings.role_info.role),
            image_access_enabled: access
                .as_ref()
                .is_some_and(|info| info.image_access_enabled),
            image_mode: access
                .and_then(|info| info.image_information)
                .and_then(|image| image.mode)
                .map(|mode| ImageMode::parse(&mode)),
            address: CopyAddress {
                group: GroupId(settings.copy_uid.group_uid.id),
                cluster: ClusterId(settings.copy_uid.global_copy_uid.cluster_uid.id),
                copy: CopyId(settings.copy_uid.global_copy_uid.copy_uid),
            },
        }
    }
}
