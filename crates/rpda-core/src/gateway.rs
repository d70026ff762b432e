//! Appliance seam consumed by the orchestration engine.

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::model::{Copy, CopyAddress, GroupId};

/// Whether the appliance accepted a mutating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    /// Request accepted.
    Accepted,
    /// Request rejected with a status code and diagnostic body.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

impl MutationStatus {
    /// Whether the request was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Typed view of the RecoverPoint REST API.
///
/// Implementations handle authentication, transport, and response decoding. Calls are
/// issued strictly one at a time.
#[async_trait]
pub trait ApplianceGateway: Send + Sync {
    /// Identifiers of every consistency group, in appliance order.
    async fn list_groups(&self) -> GatewayResult<Vec<GroupId>>;

    /// Display name of a group.
    async fn group_name(&self, group: GroupId) -> GatewayResult<String>;

    /// Fresh snapshot of a group's copies, in appliance order.
    async fn group_copies(&self, group: GroupId) -> GatewayResult<Vec<Copy>>;

    /// Groups the authenticated user may administer.
    async fn administered_groups(&self) -> GatewayResult<Vec<GroupId>>;

    /// Enable image access on the latest image, or disable image access.
    async fn set_image_access(
        &self,
        copy: &CopyAddress,
        enable: bool,
    ) -> GatewayResult<MutationStatus>;

    /// Enable or disable direct access.
    async fn set_direct_access(
        &self,
        copy: &CopyAddress,
        enable: bool,
    ) -> GatewayResult<MutationStatus>;

    /// Resume replication to the copy.
    async fn start_transfer(&self, copy: &CopyAddress) -> GatewayResult<MutationStatus>;
}
