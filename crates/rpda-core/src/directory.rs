//! Group enumeration, name lookup, and authorization filtering.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::classifier::{CopyClass, CopyClassifier};
use crate::error::GatewayResult;
use crate::gateway::ApplianceGateway;
use crate::matcher::Identifiers;
use crate::model::{Copy, GroupId, GroupRef, ReplicationGroup};

/// Group and its copies in classified order, for status display.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatus {
    /// Group identifier.
    pub id: GroupId,
    /// Group display name.
    pub name: String,
    /// Copies with their naming class, production first and test last.
    pub copies: Vec<ClassifiedCopy>,
}

/// Copy paired with its naming class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedCopy {
    /// Naming class.
    pub class: CopyClass,
    /// Copy snapshot.
    #[serde(flatten)]
    pub copy: Copy,
}

/// Read-only lookups over the appliance's consistency groups.
pub struct GroupDirectory<'a, G: ApplianceGateway + ?Sized> {
    gateway: &'a G,
}

impl<'a, G: ApplianceGateway + ?Sized> GroupDirectory<'a, G> {
    /// Directory over a gateway.
    pub const fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Every group with its name, in appliance order.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn list(&self) -> GatewayResult<Vec<GroupRef>> {
        let ids = self.gateway.list_groups().await?;
        let mut groups = Vec::with_capacity(ids.len());
        for id in ids {
            let name = self.gateway.group_name(id).await?;
            groups.push(GroupRef { id, name });
        }
        Ok(groups)
    }

    /// First group whose name equals `name` exactly.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn find_by_name(&self, name: &str) -> GatewayResult<Option<GroupRef>> {
        for id in self.gateway.list_groups().await? {
            let candidate = self.gateway.group_name(id).await?;
            if candidate == name {
                return Ok(Some(GroupRef {
                    id,
                    name: candidate,
                }));
            }
        }
        Ok(None)
    }

    /// Fresh copy snapshot for a group.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn load(&self, group: &GroupRef) -> GatewayResult<ReplicationGroup> {
        let copies = self.gateway.group_copies(group.id).await?;
        debug!(group = %group.name, copies = copies.len(), "loaded group copies");
        Ok(ReplicationGroup {
            id: group.id,
            name: group.name.clone(),
            copies,
        })
    }

    /// Identifiers of groups the authenticated user administers.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn administered(&self) -> GatewayResult<HashSet<GroupId>> {
        Ok(self
            .gateway
            .administered_groups()
            .await?
            .into_iter()
            .collect())
    }

    /// Groups the user administers, in appliance order. Other groups are dropped
    /// before any name lookup.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn authorized(&self) -> GatewayResult<Vec<GroupRef>> {
        let allowed = self.administered().await?;
        let mut groups = Vec::new();
        for id in self.gateway.list_groups().await? {
            if !allowed.contains(&id) {
                debug!(group_id = %id, "excluding group the user does not administer");
                continue;
            }
            let name = self.gateway.group_name(id).await?;
            groups.push(GroupRef { id, name });
        }
        Ok(groups)
    }

    /// Group with copies in classified order.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures.
    pub async fn describe(
        &self,
        group: &GroupRef,
        identifiers: &Identifiers,
    ) -> GatewayResult<GroupStatus> {
        let loaded = self.load(group).await?;
        let classifier = CopyClassifier::new(identifiers);
        let copies = classifier
            .order(&loaded.copies)
            .into_iter()
            .map(|copy| ClassifiedCopy {
                class: classifier.class_of(&copy.name),
                copy,
            })
            .collect();
        Ok(GroupStatus {
            id: loaded.id,
            name: loaded.name,
            copies,
        })
    }
}
