//! Error taxonomy for copy resolution and access state orchestration.
//!
//! # Design
//! - Per-group errors (`ResolutionError`, `TransitionError`, non-transport `GatewayError`)
//!   are folded into that group's outcome and never abort a batch.
//! - `CoreError` is reserved for failures that stop the whole run: the appliance cannot
//!   be reached, or the group set cannot be enumerated.

use std::error::Error;

use serde::Serialize;
use thiserror::Error;

use crate::controller::TransitionPhase;
use crate::outcome::BatchReport;

/// Result alias for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result alias for run-level operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Failure talking to the appliance API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a response (DNS, TLS, connect, timeout).
    #[error("appliance request failed during {operation}")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A read call returned a non-success status.
    #[error("appliance returned status {status} during {operation}")]
    UnexpectedStatus {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// The response body could not be decoded.
    #[error("appliance response could not be decoded during {operation}")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl GatewayError {
    /// Build a transport error from any error source.
    pub fn transport(
        operation: &'static str,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            operation,
            source: source.into(),
        }
    }

    /// Build a decode error from any error source.
    pub fn decode(
        operation: &'static str,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self::Decode {
            operation,
            source: source.into(),
        }
    }

    /// Transport failures mean the appliance is unreachable and end the run.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Operation during which the failure happened.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Transport { operation, .. }
            | Self::UnexpectedStatus { operation, .. }
            | Self::Decode { operation, .. } => operation,
        }
    }
}

/// No eligible copy matched the requested selection.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("unable to determine the {requested} (available copies: {})", format_names(.available))]
pub struct ResolutionError {
    /// Requested selection, rendered for operators.
    pub requested: String,
    /// Every non-production copy name present in the group.
    pub available: Vec<String>,
}

fn format_names(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// A mutating call was not accepted, after any retries the phase allows.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{phase} rejected after {attempts} attempt(s) with status {status}: {body}")]
pub struct TransitionError {
    /// Phase that issued the rejected request.
    pub phase: TransitionPhase,
    /// Number of requests issued.
    pub attempts: u32,
    /// Last HTTP status code.
    pub status: u16,
    /// Last response body.
    pub body: String,
}

/// Cause recorded against a single group's failed outcome.
#[derive(Debug, Error)]
pub enum GroupFailure {
    /// The requested copy could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// A mutating request was rejected.
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// A non-transport gateway error occurred while processing the group.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// No group with the requested name exists.
    #[error("consistency group '{name}' not found")]
    GroupNotFound {
        /// Requested group name.
        name: String,
    },
}

impl GroupFailure {
    /// Short machine-readable kind label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Resolution(_) => "resolution",
            Self::Transition(_) => "transition",
            Self::Gateway(_) => "gateway",
            Self::GroupNotFound { .. } => "group_not_found",
        }
    }
}

/// Failure that ends the whole run.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The appliance could not be reached, or enumeration failed.
    #[error("appliance operation '{operation}' failed")]
    Gateway {
        /// Orchestration step that was running.
        operation: &'static str,
        /// Source gateway error.
        #[source]
        source: GatewayError,
    },
    /// The appliance became unreachable partway through a batch.
    #[error("appliance operation '{operation}' failed while processing group '{group}'")]
    Aborted {
        /// Orchestration step that was running.
        operation: &'static str,
        /// Group being processed when the run stopped.
        group: String,
        /// Outcomes of the groups processed before the run stopped.
        report: Box<BatchReport>,
        /// Source gateway error.
        #[source]
        source: GatewayError,
    },
}

impl CoreError {
    pub(crate) const fn gateway(operation: &'static str, source: GatewayError) -> Self {
        Self::Gateway { operation, source }
    }

    /// Attach the outcomes gathered so far to a run-ending failure.
    pub(crate) fn aborted(self, group: &str, report: BatchReport) -> Self {
        match self {
            Self::Gateway { operation, source } => Self::Aborted {
                operation,
                group: group.to_string(),
                report: Box::new(report),
                source,
            },
            aborted @ Self::Aborted { .. } => aborted,
        }
    }

    /// Outcomes of the groups that completed before the run stopped, if any were gathered.
    #[must_use]
    pub fn partial_report(&self) -> Option<&BatchReport> {
        match self {
            Self::Gateway { .. } => None,
            Self::Aborted { report, .. } => Some(report.as_ref()),
        }
    }
}
