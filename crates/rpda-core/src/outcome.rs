//! Per-group outcomes and the batch report.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::controller::TransitionReport;
use crate::error::GroupFailure;
use crate::model::{Direction, GroupId};

/// Why a group was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The copy already reports the `ACTIVE` role.
    AlreadyActive,
    /// The authenticated user does not administer the group.
    NotAuthorized,
}

impl SkipReason {
    /// Operator-facing description.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::AlreadyActive => "image access already enabled",
            Self::NotAuthorized => "user is not an administrator of this group",
        }
    }
}

/// Terminal status of one group.
#[derive(Debug)]
pub enum OutcomeStatus {
    /// Transition completed (or was simulated in check mode).
    Succeeded {
        /// True when running in check mode.
        simulated: bool,
    },
    /// Nothing was done.
    Skipped(SkipReason),
    /// The group could not be processed.
    Failed(GroupFailure),
}

impl OutcomeStatus {
    /// Short label for tables and logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { simulated: false } => "succeeded",
            Self::Succeeded { simulated: true } => "simulated",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    /// Human-readable detail, empty for plain success.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Succeeded { simulated: false } => String::new(),
            Self::Succeeded { simulated: true } => "check mode, no changes made".to_string(),
            Self::Skipped(reason) => reason.describe().to_string(),
            Self::Failed(failure) => failure.to_string(),
        }
    }
}

/// Result of processing one group.
#[derive(Debug)]
pub struct GroupOutcome {
    /// Group display name as requested or enumerated.
    pub group: String,
    /// Group identifier, when the group was found.
    pub group_id: Option<GroupId>,
    /// Resolved copy name, when resolution succeeded.
    pub copy: Option<String>,
    /// Requested direction.
    pub direction: Direction,
    /// Terminal status.
    pub status: OutcomeStatus,
    /// Controller trace, when the controller ran.
    pub transition: Option<TransitionReport>,
}

impl GroupOutcome {
    /// Whether the group ended in failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    group: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_id: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    copy: Option<&'a str>,
    direction: Direction,
    status: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transition: Option<&'a TransitionReport>,
}

impl Serialize for GroupOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OutcomeRecord {
            group: &self.group,
            group_id: self.group_id,
            copy: self.copy.as_deref(),
            direction: self.direction,
            status: self.status.label(),
            detail: self.status.detail(),
            failure_kind: match &self.status {
                OutcomeStatus::Failed(failure) => Some(failure.kind()),
                _ => None,
            },
            transition: self.transition.as_ref(),
        }
        .serialize(serializer)
    }
}

/// Outcomes of a batch, in processing order.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// Wall-clock start of the batch.
    pub started_at: DateTime<Utc>,
    /// Time spent processing, including pacing delays.
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// One outcome per processed group.
    pub outcomes: Vec<GroupOutcome>,
}

fn serialize_secs<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(value.as_secs_f64())
}

impl BatchReport {
    /// Number of succeeded (including simulated) groups.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Succeeded { .. }))
    }

    /// Number of skipped groups.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Skipped(_)))
    }

    /// Number of failed groups.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Failed(_)))
    }

    /// Whether any group failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(GroupOutcome::is_failure)
    }

    fn count(&self, predicate: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.status))
            .count()
    }
}
