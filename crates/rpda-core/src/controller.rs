//! Per-copy state machine that switches direct image access on or off.
//!
//! Enable: `Idle -> ImageAccessEnabling -> ImageAccessPolling -> DirectAccessEnabling -> Done`
//!
//! Disable: `Idle -> ImageAccessDisabling -> ImageAccessPolling -> TransferStarting -> Done`
//!
//! Polling never fails a transition: when the attempt budget runs out the controller logs a
//! warning and moves on. The final mutating step retries a rejected request with the same
//! budget; the image access step does not retry.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, TransitionError};
use crate::gateway::{ApplianceGateway, MutationStatus};
use crate::model::{Copy, CopyAddress, Direction, ImageMode, Task};
use crate::outcome::SkipReason;

/// Default delay between polling attempts.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(3);
/// Default polling and retry budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Timing and mode knobs for a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionSettings {
    /// Delay between polling attempts and between retries of a rejected request.
    pub poll_delay: Duration,
    /// Maximum polling attempts per condition and maximum requests per retried step.
    pub max_attempts: u32,
    /// Log intended mutations instead of issuing them; skip polling.
    pub dry_run: bool,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            poll_delay: DEFAULT_POLL_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            dry_run: false,
        }
    }
}

impl TransitionSettings {
    const fn attempt_budget(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }
}

/// States a copy passes through during a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    /// Nothing issued yet.
    Idle,
    /// Requesting image access on the latest image.
    ImageAccessEnabling,
    /// Requesting image access be disabled.
    ImageAccessDisabling,
    /// Waiting for the image access flag (and, when enabling, logged access mode).
    ImageAccessPolling,
    /// Requesting direct access.
    DirectAccessEnabling,
    /// Requesting replication resume.
    TransferStarting,
    /// Transition finished.
    Done,
    /// Nothing to do for this copy.
    Skipped,
    /// A mutating request was rejected.
    Failed,
}

impl TransitionPhase {
    /// Snake case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ImageAccessEnabling => "image_access_enabling",
            Self::ImageAccessDisabling => "image_access_disabling",
            Self::ImageAccessPolling => "image_access_polling",
            Self::DirectAccessEnabling => "direct_access_enabling",
            Self::TransferStarting => "transfer_starting",
            Self::Done => "done",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl Display for TransitionPhase {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Condition a polling loop waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollTarget {
    /// Image access enabled flag equals the desired value.
    ImageAccess,
    /// Image mode reports logged access.
    LoggedAccess,
}

impl PollTarget {
    fn satisfied_by(self, copy: &Copy, desired: bool) -> bool {
        match self {
            Self::ImageAccess => copy.image_access_enabled == desired,
            Self::LoggedAccess => copy.has_logged_access(),
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::ImageAccess => "image access",
            Self::LoggedAccess => "logged access",
        }
    }
}

/// Result of one bounded polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollResult {
    /// Condition that was polled.
    pub target: PollTarget,
    /// Reads issued.
    pub attempts: u32,
    /// Whether the condition was observed before the budget ran out.
    pub converged: bool,
}

/// Terminal status of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransitionStatus {
    /// Every step completed, or would have in check mode.
    Succeeded {
        /// True when no request was issued.
        simulated: bool,
    },
    /// Nothing needed doing.
    Skipped {
        /// Why the copy was skipped.
        reason: SkipReason,
    },
    /// A mutating request was rejected.
    Failed {
        /// Rejection detail.
        error: TransitionError,
    },
}

/// Trace of a single transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionReport {
    /// Resolved unit of work.
    pub task: Task,
    /// Phases entered, in order.
    pub phases: Vec<TransitionPhase>,
    /// Polling loops run, in order.
    pub polls: Vec<PollResult>,
    /// Terminal status.
    pub status: TransitionStatus,
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    ImageAccess(bool),
    DirectAccess(bool),
    StartTransfer,
}

impl Display for Mutation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageAccess(true) => formatter.write_str("enable latest image access"),
            Self::ImageAccess(false) => formatter.write_str("disable image access"),
            Self::DirectAccess(true) => formatter.write_str("enable direct access"),
            Self::DirectAccess(false) => formatter.write_str("disable direct access"),
            Self::StartTransfer => formatter.write_str("start transfer"),
        }
    }
}

enum StepFailure {
    Rejected(TransitionError),
    Gateway(GatewayError),
}

impl From<GatewayError> for StepFailure {
    fn from(err: GatewayError) -> Self {
        Self::Gateway(err)
    }
}

/// Drives one copy through an access state transition.
pub struct AccessStateController<'a, G: ApplianceGateway + ?Sized> {
    gateway: &'a G,
    settings: &'a TransitionSettings,
}

impl<'a, G: ApplianceGateway + ?Sized> AccessStateController<'a, G> {
    /// Controller over a gateway with the given settings.
    pub const fn new(gateway: &'a G, settings: &'a TransitionSettings) -> Self {
        Self { gateway, settings }
    }

    /// Run the transition for `copy`.
    ///
    /// Rejected requests end in [`TransitionStatus::Failed`]; the report is still returned.
    ///
    /// # Errors
    ///
    /// Returns gateway errors (transport, unexpected read status, decode) unchanged so the
    /// caller can decide whether they end the run.
    pub async fn run(
        &self,
        group_name: &str,
        copy: &Copy,
        direction: Direction,
    ) -> Result<TransitionReport, GatewayError> {
        let mut report = TransitionReport {
            task: Task::new(group_name, copy, direction),
            phases: vec![TransitionPhase::Idle],
            polls: Vec::new(),
            status: TransitionStatus::Succeeded {
                simulated: self.settings.dry_run,
            },
        };

        if direction == Direction::Enable && copy.is_active() {
            info!(
                group = group_name,
                copy = %copy.name,
                "image access already enabled for copy"
            );
            report.phases.push(TransitionPhase::Skipped);
            report.status = TransitionStatus::Skipped {
                reason: SkipReason::AlreadyActive,
            };
            return Ok(report);
        }

        match self.drive(&mut report).await {
            Ok(()) => {
                report.phases.push(TransitionPhase::Done);
                Ok(report)
            }
            Err(StepFailure::Rejected(error)) => {
                report.phases.push(TransitionPhase::Failed);
                report.status = TransitionStatus::Failed { error };
                Ok(report)
            }
            Err(StepFailure::Gateway(err)) => Err(err),
        }
    }

    async fn drive(&self, report: &mut TransitionReport) -> Result<(), StepFailure> {
        let task = report.task.clone();
        let enable = task.direction.wants_image_access();

        let phase = if enable {
            TransitionPhase::ImageAccessEnabling
        } else {
            TransitionPhase::ImageAccessDisabling
        };
        report.phases.push(phase);
        self.issue(&task, phase, Mutation::ImageAccess(enable), 1)
            .await?;

        report.phases.push(TransitionPhase::ImageAccessPolling);
        if self.settings.dry_run {
            debug!(group = %task.group_name, copy = %task.copy_name, "check mode: polling skipped");
        } else {
            report
                .polls
                .push(self.poll(&task, PollTarget::ImageAccess).await?);
            if enable {
                report
                    .polls
                    .push(self.poll(&task, PollTarget::LoggedAccess).await?);
            }
        }

        let (phase, mutation) = if enable {
            (TransitionPhase::DirectAccessEnabling, Mutation::DirectAccess(true))
        } else {
            (TransitionPhase::TransferStarting, Mutation::StartTransfer)
        };
        report.phases.push(phase);
        self.issue(&task, phase, mutation, self.settings.attempt_budget())
            .await?;
        Ok(())
    }

    async fn issue(
        &self,
        task: &Task,
        phase: TransitionPhase,
        mutation: Mutation,
        attempts_allowed: u32,
    ) -> Result<(), StepFailure> {
        if self.settings.dry_run {
            info!(
                group = %task.group_name,
                copy = %task.copy_name,
                phase = %phase,
                "check mode: would {mutation}"
            );
            return Ok(());
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send(&task.address, mutation).await? {
                MutationStatus::Accepted => {
                    info!(
                        group = %task.group_name,
                        copy = %task.copy_name,
                        phase = %phase,
                        attempt,
                        "{mutation} accepted"
                    );
                    return Ok(());
                }
                MutationStatus::Rejected { status, body } => {
                    debug!(
                        group = %task.group_name,
                        copy = %task.copy_name,
                        phase = %phase,
                        attempt,
                        status,
                        "{mutation} rejected"
                    );
                    if attempt >= attempts_allowed {
                        warn!(
                            group = %task.group_name,
                            copy = %task.copy_name,
                            phase = %phase,
                            attempts = attempt,
                            status,
                            "failed to {mutation}"
                        );
                        return Err(StepFailure::Rejected(TransitionError {
                            phase,
                            attempts: attempt,
                            status,
                            body,
                        }));
                    }
                    sleep(self.settings.poll_delay).await;
                }
            }
        }
    }

    async fn send(
        &self,
        address: &CopyAddress,
        mutation: Mutation,
    ) -> Result<MutationStatus, GatewayError> {
        match mutation {
            Mutation::ImageAccess(enable) => self.gateway.set_image_access(address, enable).await,
            Mutation::DirectAccess(enable) => self.gateway.set_direct_access(address, enable).await,
            Mutation::StartTransfer => self.gateway.start_transfer(address).await,
        }
    }

    async fn poll(&self, task: &Task, target: PollTarget) -> Result<PollResult, GatewayError> {
        let desired = task.direction.wants_image_access();
        let budget = self.settings.attempt_budget();
        info!(
            group = %task.group_name,
            copy = %task.copy_name,
            "waiting for {} to update",
            target.label()
        );

        for attempt in 1..=budget {
            let current = self.fetch(task).await?;
            if current
                .as_ref()
                .is_some_and(|copy| target.satisfied_by(copy, desired))
            {
                debug!(
                    group = %task.group_name,
                    copy = %task.copy_name,
                    attempt,
                    "{} converged",
                    target.label()
                );
                return Ok(PollResult {
                    target,
                    attempts: attempt,
                    converged: true,
                });
            }
            debug!(
                group = %task.group_name,
                copy = %task.copy_name,
                attempt,
                image_access_enabled = ?current.as_ref().map(|copy| copy.image_access_enabled),
                image_mode = ?current
                    .as_ref()
                    .and_then(|copy| copy.image_mode.as_ref())
                    .map(ImageMode::as_str),
                "polling {}",
                target.label()
            );
            if attempt < budget {
                sleep(self.settings.poll_delay).await;
            }
        }

        warn!(
            group = %task.group_name,
            copy = %task.copy_name,
            attempts = budget,
            waiting_for = target.label(),
            "maximum poll count reached; continuing (consider raising poll max)"
        );
        Ok(PollResult {
            target,
            attempts: budget,
            converged: false,
        })
    }

    async fn fetch(&self, task: &Task) -> Result<Option<Copy>, GatewayError> {
        let copies = self.gateway.group_copies(task.address.group).await?;
        let found = copies.into_iter().find(|copy| {
            copy.address.copy == task.address.copy && copy.address.cluster == task.address.cluster
        });
        if found.is_none() {
            debug!(
                group = %task.group_name,
                copy = %task.copy_name,
                "copy missing from group snapshot"
            );
        }
        Ok(found)
    }
}
