//! Consistency group and copy snapshots as reported by the appliance.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Role string the appliance reports for the copy currently serving production I/O.
pub const ROLE_ACTIVE: &str = "ACTIVE";
/// Role string the appliance reports for replica copies.
pub const ROLE_REPLICA: &str = "REPLICA";
/// Image mode string reported once logged access is fully established.
pub const MODE_LOGGED_ACCESS: &str = "LOGGED_ACCESS";

/// Opaque consistency group identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

/// Cluster identifier within the RecoverPoint system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub u64);

/// Copy identifier, unique within a group and cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CopyId(pub u64);

impl Display for GroupId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Identifiers needed to address a copy in mutating API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CopyAddress {
    /// Owning consistency group.
    pub group: GroupId,
    /// Cluster hosting the copy.
    pub cluster: ClusterId,
    /// Copy identifier.
    pub copy: CopyId,
}

/// Replication role reported for a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyRole {
    /// Copy is serving I/O (production, or a replica that has been switched to image access).
    Active,
    /// Copy is receiving replicated writes.
    Replica,
    /// Any role string this tool does not interpret.
    Other(String),
}

impl CopyRole {
    /// Interpret the role string from the appliance.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            ROLE_ACTIVE => Self::Active,
            ROLE_REPLICA => Self::Replica,
            other => Self::Other(other.to_string()),
        }
    }

    /// Role rendered the way the appliance spells it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => ROLE_ACTIVE,
            Self::Replica => ROLE_REPLICA,
            Self::Other(raw) => raw,
        }
    }
}

/// Image access mode of a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    /// Logged access to the image is active.
    LoggedAccess,
    /// Any other mode string.
    Other(String),
}

impl ImageMode {
    /// Interpret the image mode string from the appliance.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == MODE_LOGGED_ACCESS {
            Self::LoggedAccess
        } else {
            Self::Other(raw.to_string())
        }
    }

    /// Mode rendered the way the appliance spells it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::LoggedAccess => MODE_LOGGED_ACCESS,
            Self::Other(raw) => raw,
        }
    }
}

/// Point-in-time snapshot of a single copy. Never cached across polling steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copy {
    /// Display name of the copy.
    pub name: String,
    /// Replication role.
    pub role: CopyRole,
    /// Whether image access is currently enabled.
    pub image_access_enabled: bool,
    /// Current image mode, when image access information was reported.
    pub image_mode: Option<ImageMode>,
    /// Identifiers used to address the copy.
    pub address: CopyAddress,
}

impl Copy {
    /// Whether the copy reports the `ACTIVE` role.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.role == CopyRole::Active
    }

    /// Whether the copy reports logged access as its image mode.
    #[must_use]
    pub fn has_logged_access(&self) -> bool {
        matches!(self.image_mode, Some(ImageMode::LoggedAccess))
    }
}

/// Group identity as returned by enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    /// Group identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
}

/// Consistency group with its member copies in appliance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationGroup {
    /// Group identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Member copies in the order the appliance returned them.
    pub copies: Vec<Copy>,
}

/// Role tokens an operator can request instead of an exact copy name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleToken {
    /// Test copy, selected by the test identifier rule.
    Test,
    /// Disaster recovery copy, selected by the DR identifier rule.
    Dr,
}

impl RoleToken {
    /// Lowercase token as accepted on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Dr => "dr",
        }
    }
}

/// Operator intent describing which copy to operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionIntent {
    /// Exact copy name.
    Named(String),
    /// Copy selected by role token.
    Role(RoleToken),
}

impl Display for SelectionIntent {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(formatter, "copy '{name}'"),
            Self::Role(token) => write!(formatter, "{} copy", token.as_str()),
        }
    }
}

/// Direction of an access state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Enable image access, then direct access.
    Enable,
    /// Disable image access, then resume transfer.
    Disable,
}

impl Direction {
    /// Desired value of the image-access-enabled flag after the transition.
    #[must_use]
    pub const fn wants_image_access(self) -> bool {
        matches!(self, Self::Enable)
    }

    /// Lowercase label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
        }
    }
}

/// Resolved unit of work handed between controller steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Group display name.
    pub group_name: String,
    /// Copy display name.
    pub copy_name: String,
    /// Copy address.
    pub address: CopyAddress,
    /// Requested direction.
    pub direction: Direction,
}

impl Task {
    /// Build a task for the given copy.
    #[must_use]
    pub fn new(group_name: impl Into<String>, copy: &Copy, direction: Direction) -> Self {
        Self {
            group_name: group_name.into(),
            copy_name: copy.name.clone(),
            address: copy.address,
            direction,
        }
    }
}
