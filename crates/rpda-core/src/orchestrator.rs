//! Batch execution of access state transitions across consistency groups.
//!
//! Groups are processed strictly one after another. A failure inside one group is folded
//! into that group's outcome and the batch continues; only transport failures (appliance
//! unreachable) and enumeration failures end the run, and a run that stops mid-batch still
//! hands back the outcomes gathered so far.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::controller::{AccessStateController, TransitionSettings, TransitionStatus};
use crate::directory::GroupDirectory;
use crate::error::{CoreError, CoreResult, GatewayError, GroupFailure};
use crate::gateway::ApplianceGateway;
use crate::matcher::Identifiers;
use crate::model::{Direction, GroupRef, SelectionIntent};
use crate::outcome::{BatchReport, GroupOutcome, OutcomeStatus, SkipReason};
use crate::resolver::CopyResolver;

/// Immutable run settings handed to the orchestrator at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Per-copy transition settings.
    pub transition: TransitionSettings,
    /// Pause between consecutive groups in a batch.
    pub group_delay: Duration,
    /// Restrict batches to groups the authenticated user administers.
    pub enforce_group_admin: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            transition: TransitionSettings::default(),
            group_delay: Duration::ZERO,
            enforce_group_admin: true,
        }
    }
}

/// Runs transitions for one or many groups and collects their outcomes.
pub struct BatchOrchestrator<G: ApplianceGateway + ?Sized> {
    gateway: Arc<G>,
    identifiers: Identifiers,
    config: OrchestratorConfig,
}

impl<G: ApplianceGateway + ?Sized> BatchOrchestrator<G> {
    /// Orchestrator over a shared gateway.
    #[must_use]
    pub const fn new(
        gateway: Arc<G>,
        identifiers: Identifiers,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            gateway,
            identifiers,
            config,
        }
    }

    /// Settings this orchestrator was built with.
    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Process every eligible group in appliance order.
    ///
    /// When group administration is enforced, only groups the user administers are
    /// eligible.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when the groups cannot be enumerated or the appliance becomes
    /// unreachable mid-batch.
    pub async fn run_all(
        &self,
        intent: &SelectionIntent,
        direction: Direction,
    ) -> CoreResult<BatchReport> {
        let directory = GroupDirectory::new(self.gateway.as_ref());
        let groups = if self.config.enforce_group_admin {
            directory.authorized().await
        } else {
            directory.list().await
        }
        .map_err(|err| CoreError::gateway("enumerate_groups", err))?;
        info!(
            groups = groups.len(),
            direction = direction.as_str(),
            "processing consistency groups"
        );
        self.run_groups(&groups, intent, direction).await
    }

    /// Process a single group by exact name.
    ///
    /// An unknown name or a group the user does not administer is reported as that
    /// group's outcome, not as an error.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] when the lookup itself fails or the appliance is unreachable.
    pub async fn run_one(
        &self,
        name: &str,
        intent: &SelectionIntent,
        direction: Direction,
    ) -> CoreResult<BatchReport> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let directory = GroupDirectory::new(self.gateway.as_ref());

        let found = directory
            .find_by_name(name)
            .await
            .map_err(|err| CoreError::gateway("find_group", err))?;

        let outcome = match found {
            None => {
                warn!(group = name, "consistency group not found");
                GroupOutcome {
                    group: name.to_string(),
                    group_id: None,
                    copy: None,
                    direction,
                    status: OutcomeStatus::Failed(GroupFailure::GroupNotFound {
                        name: name.to_string(),
                    }),
                    transition: None,
                }
            }
            Some(group) => {
                if self.config.enforce_group_admin
                    && !directory
                        .administered()
                        .await
                        .map_err(|err| CoreError::gateway("administered_groups", err))?
                        .contains(&group.id)
                {
                    warn!(group = %group.name, "user is not an administrator of this group");
                    GroupOutcome {
                        group: group.name,
                        group_id: Some(group.id),
                        copy: None,
                        direction,
                        status: OutcomeStatus::Skipped(SkipReason::NotAuthorized),
                        transition: None,
                    }
                } else {
                    match self.process(&group, intent, direction).await {
                        Ok(outcome) => outcome,
                        Err(err) => {
                            return Err(err.aborted(
                                &group.name,
                                BatchReport {
                                    started_at,
                                    elapsed: clock.elapsed(),
                                    outcomes: Vec::new(),
                                },
                            ));
                        }
                    }
                }
            }
        };

        Ok(BatchReport {
            started_at,
            elapsed: clock.elapsed(),
            outcomes: vec![outcome],
        })
    }

    /// Process the given groups in order, pausing between consecutive groups.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Aborted`] when the appliance becomes unreachable; it carries the
    /// outcomes of the groups processed before that point.
    pub async fn run_groups(
        &self,
        groups: &[GroupRef],
        intent: &SelectionIntent,
        direction: Direction,
    ) -> CoreResult<BatchReport> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut outcomes = Vec::with_capacity(groups.len());

        for (index, group) in groups.iter().enumerate() {
            if index > 0 && !self.config.group_delay.is_zero() {
                info!(
                    delay_secs = self.config.group_delay.as_secs(),
                    "pausing before next consistency group"
                );
                sleep(self.config.group_delay).await;
            }
            match self.process(group, intent, direction).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    warn!(
                        group = %group.name,
                        completed = outcomes.len(),
                        "appliance unreachable, stopping batch"
                    );
                    return Err(err.aborted(
                        &group.name,
                        BatchReport {
                            started_at,
                            elapsed: clock.elapsed(),
                            outcomes,
                        },
                    ));
                }
            }
        }

        Ok(BatchReport {
            started_at,
            elapsed: clock.elapsed(),
            outcomes,
        })
    }

    async fn process(
        &self,
        group: &GroupRef,
        intent: &SelectionIntent,
        direction: Direction,
    ) -> CoreResult<GroupOutcome> {
        let mut outcome = GroupOutcome {
            group: group.name.clone(),
            group_id: Some(group.id),
            copy: None,
            direction,
            status: OutcomeStatus::Succeeded {
                simulated: self.config.transition.dry_run,
            },
            transition: None,
        };

        let loaded = match GroupDirectory::new(self.gateway.as_ref()).load(group).await {
            Ok(loaded) => loaded,
            Err(err) => {
                outcome.status = Self::gateway_failure(group, "load_group", err)?;
                return Ok(outcome);
            }
        };

        let copy = match CopyResolver::new(&self.identifiers).resolve(&loaded.copies, intent) {
            Ok(copy) => copy,
            Err(err) => {
                warn!(group = %group.name, error = %err, "copy resolution failed");
                outcome.status = OutcomeStatus::Failed(err.into());
                return Ok(outcome);
            }
        };
        outcome.copy = Some(copy.name.clone());
        info!(
            group = %group.name,
            copy = %copy.name,
            direction = direction.as_str(),
            "starting access transition"
        );

        let controller = AccessStateController::new(self.gateway.as_ref(), &self.config.transition);
        match controller.run(&group.name, copy, direction).await {
            Ok(report) => {
                outcome.status = match &report.status {
                    TransitionStatus::Succeeded { simulated } => OutcomeStatus::Succeeded {
                        simulated: *simulated,
                    },
                    TransitionStatus::Skipped { reason } => OutcomeStatus::Skipped(*reason),
                    TransitionStatus::Failed { error } => {
                        OutcomeStatus::Failed(GroupFailure::Transition(error.clone()))
                    }
                };
                outcome.transition = Some(report);
            }
            Err(err) => {
                outcome.status = Self::gateway_failure(group, "transition", err)?;
            }
        }
        Ok(outcome)
    }

    fn gateway_failure(
        group: &GroupRef,
        operation: &'static str,
        err: GatewayError,
    ) -> CoreResult<OutcomeStatus> {
        if err.is_transport() {
            return Err(CoreError::gateway(operation, err));
        }
        warn!(group = %group.name, error = %err, "appliance call failed for group");
        Ok(OutcomeStatus::Failed(GroupFailure::Gateway(err)))
    }
}
