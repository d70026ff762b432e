//! Scripted in-memory appliance implementing [`ApplianceGateway`].
//!
//! Accepted image access changes do not show up immediately: each copy settles after a
//! configurable number of snapshot reads, the way the real appliance lags behind requests.
//! Logged access mode can be made to lag a further number of reads behind the enabled flag.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rpda_core::{
    ApplianceGateway, Copy, CopyAddress, CopyRole, GatewayError, GatewayResult, GroupId,
    ImageMode, MutationStatus,
};

/// Mutating call kinds recorded by the appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// `image_access/latest/enable`.
    EnableImageAccess,
    /// `disable_image_access`.
    DisableImageAccess,
    /// `enable_direct_access`.
    EnableDirectAccess,
    /// `disable_direct_access`.
    DisableDirectAccess,
    /// `start_transfer`.
    StartTransfer,
}

/// One recorded mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedMutation {
    /// Call kind.
    pub kind: MutationKind,
    /// Target copy.
    pub address: CopyAddress,
}

/// Failure injected into snapshot reads of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFailure {
    /// Simulate an unreachable appliance.
    Transport,
    /// Simulate a non-success HTTP status.
    Status(u16),
}

#[derive(Debug, Clone)]
struct ScriptedGroup {
    id: GroupId,
    name: String,
    copies: Vec<Copy>,
}

#[derive(Debug, Clone, Copy)]
struct PendingChange {
    reads_left: u32,
    enable: bool,
}

#[derive(Debug, Default)]
struct State {
    groups: Vec<ScriptedGroup>,
    administered: Vec<GroupId>,
    settle_reads: u32,
    mode_lag: u32,
    pending: HashMap<CopyAddress, PendingChange>,
    pending_mode: HashMap<CopyAddress, u32>,
    rejections: HashMap<MutationKind, VecDeque<(u16, String)>>,
    read_failures: HashMap<GroupId, ReadFailure>,
    mutations: Vec<RecordedMutation>,
    copy_reads: HashMap<GroupId, u32>,
}

/// In-memory appliance with scripted convergence, rejections, and failures.
#[derive(Debug, Default)]
pub struct ScriptedAppliance {
    state: Mutex<State>,
}

impl ScriptedAppliance {
    /// Empty appliance whose copies settle on the first read after a change.
    #[must_use]
    pub fn new() -> Self {
        let appliance = Self::default();
        appliance.lock().settle_reads = 1;
        appliance
    }

    /// Add a group the user administers.
    #[must_use]
    pub fn with_group(self, id: GroupId, name: &str, copies: Vec<Copy>) -> Self {
        {
            let mut state = self.lock();
            state.administered.push(id);
            state.groups.push(ScriptedGroup {
                id,
                name: name.to_string(),
                copies,
            });
        }
        self
    }

    /// Add a group the user does not administer.
    #[must_use]
    pub fn with_foreign_group(self, id: GroupId, name: &str, copies: Vec<Copy>) -> Self {
        self.lock().groups.push(ScriptedGroup {
            id,
            name: name.to_string(),
            copies,
        });
        self
    }

    /// Number of snapshot reads after an accepted image access change before the copy
    /// reports the new state. Zero and one both mean the next read.
    #[must_use]
    pub fn settle_after(self, reads: u32) -> Self {
        self.lock().settle_reads = reads.max(1);
        self
    }

    /// Number of further snapshot reads, after image access reports enabled, before the
    /// copy reports logged access mode. Zero reports both on the same read.
    #[must_use]
    pub fn settle_mode_after(self, reads: u32) -> Self {
        self.lock().mode_lag = reads;
        self
    }

    /// Reject the next `times` calls of `kind` with the given status and body.
    #[must_use]
    pub fn reject(self, kind: MutationKind, times: usize, status: u16, body: &str) -> Self {
        self.lock()
            .rejections
            .entry(kind)
            .or_default()
            .extend(std::iter::repeat_n((status, body.to_string()), times));
        self
    }

    /// Fail every snapshot read of `group`.
    #[must_use]
    pub fn fail_reads(self, group: GroupId, failure: ReadFailure) -> Self {
        self.lock().read_failures.insert(group, failure);
        self
    }

    /// Mutating calls received so far, in order.
    #[must_use]
    pub fn mutations(&self) -> Vec<RecordedMutation> {
        self.lock().mutations.clone()
    }

    /// Mutation kinds received for one group, in order.
    #[must_use]
    pub fn mutation_kinds(&self, group: GroupId) -> Vec<MutationKind> {
        self.lock()
            .mutations
            .iter()
            .filter(|mutation| mutation.address.group == group)
            .map(|mutation| mutation.kind)
            .collect()
    }

    /// Snapshot reads served for one group.
    #[must_use]
    pub fn copy_reads(&self, group: GroupId) -> u32 {
        self.lock().copy_reads.get(&group).copied().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, kind: MutationKind, address: &CopyAddress) -> MutationStatus {
        let mut state = self.lock();
        state.mutations.push(RecordedMutation {
            kind,
            address: *address,
        });
        if let Some((status, body)) = state
            .rejections
            .get_mut(&kind)
            .and_then(VecDeque::pop_front)
        {
            return MutationStatus::Rejected { status, body };
        }
        let enable = match kind {
            MutationKind::EnableImageAccess => true,
            MutationKind::DisableImageAccess => false,
            _ => return MutationStatus::Accepted,
        };
        let reads_left = state.settle_reads;
        state
            .pending
            .insert(*address, PendingChange { reads_left, enable });
        MutationStatus::Accepted
    }
}

impl State {
    fn group(&self, id: GroupId) -> GatewayResult<&ScriptedGroup> {
        self.groups
            .iter()
            .find(|group| group.id == id)
            .ok_or_else(|| GatewayError::UnexpectedStatus {
                operation: "scripted.group",
                status: 404,
                body: format!("group {id} not found"),
            })
    }

    fn settle(&mut self, group: GroupId) {
        let mut mode_ready = Vec::new();
        for (address, reads_left) in &mut self.pending_mode {
            if address.group != group {
                continue;
            }
            *reads_left = reads_left.saturating_sub(1);
            if *reads_left == 0 {
                mode_ready.push(*address);
            }
        }
        for address in mode_ready {
            self.pending_mode.remove(&address);
            if let Some(copy) = self.copy_mut(group, address) {
                copy.image_mode = Some(ImageMode::LoggedAccess);
            }
        }

        let mut ready = Vec::new();
        for (address, change) in &mut self.pending {
            if address.group != group {
                continue;
            }
            change.reads_left = change.reads_left.saturating_sub(1);
            if change.reads_left == 0 {
                ready.push((*address, change.enable));
            }
        }
        let mode_lag = self.mode_lag;
        for (address, enable) in ready {
            self.pending.remove(&address);
            let Some(copy) = self.copy_mut(group, address) else {
                continue;
            };
            copy.image_access_enabled = enable;
            if !enable {
                copy.image_mode = None;
                copy.role = CopyRole::Replica;
                self.pending_mode.remove(&address);
                continue;
            }
            copy.role = CopyRole::Active;
            if mode_lag == 0 {
                copy.image_mode = Some(ImageMode::LoggedAccess);
            } else {
                self.pending_mode.insert(address, mode_lag);
            }
        }
    }

    fn copy_mut(&mut self, group: GroupId, address: CopyAddress) -> Option<&mut Copy> {
        self.groups
            .iter_mut()
            .filter(|scripted| scripted.id == group)
            .flat_map(|scripted| scripted.copies.iter_mut())
            .find(|copy| copy.address == address)
    }
}

#[async_trait]
impl ApplianceGateway for ScriptedAppliance {
    async fn list_groups(&self) -> GatewayResult<Vec<GroupId>> {
        Ok(self.lock().groups.iter().map(|group| group.id).collect())
    }

    async fn group_name(&self, group: GroupId) -> GatewayResult<String> {
        Ok(self.lock().group(group)?.name.clone())
    }

    async fn group_copies(&self, group: GroupId) -> GatewayResult<Vec<Copy>> {
        let mut state = self.lock();
        *state.copy_reads.entry(group).or_default() += 1;
        match state.read_failures.get(&group) {
            Some(ReadFailure::Transport) => {
                return Err(GatewayError::transport(
                    "scripted.group_copies",
                    io::Error::new(io::ErrorKind::ConnectionRefused, "appliance unreachable"),
                ));
            }
            Some(ReadFailure::Status(status)) => {
                return Err(GatewayError::UnexpectedStatus {
                    operation: "scripted.group_copies",
                    status: *status,
                    body: "scripted failure".to_string(),
                });
            }
            None => {}
        }
        state.settle(group);
        Ok(state.group(group)?.copies.clone())
    }

    async fn administered_groups(&self) -> GatewayResult<Vec<GroupId>> {
        Ok(self.lock().administered.clone())
    }

    async fn set_image_access(
        &self,
        copy: &CopyAddress,
        enable: bool,
    ) -> GatewayResult<MutationStatus> {
        let kind = if enable {
            MutationKind::EnableImageAccess
        } else {
            MutationKind::DisableImageAccess
        };
        Ok(self.mutate(kind, copy))
    }

    async fn set_direct_access(
        &self,
        copy: &CopyAddress,
        enable: bool,
    ) -> GatewayResult<MutationStatus> {
        let kind = if enable {
            MutationKind::EnableDirectAccess
        } else {
            MutationKind::DisableDirectAccess
        };
        Ok(self.mutate(kind, copy))
    }

    async fn start_transfer(&self, copy: &CopyAddress) -> GatewayResult<MutationStatus> {
        Ok(self.mutate(MutationKind::StartTransfer, copy))
    }
}
