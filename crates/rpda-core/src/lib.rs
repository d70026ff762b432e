#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(dead_code, unused)]

//! Copy resolution and direct image access orchestration for RecoverPoint
//! consistency groups.
//!
//! Layout:
//! - `model.rs`: groups, copies, identifiers and addressing newtypes
//! - `matcher.rs`: name matchers (substring or regular expression) and identifier rules
//! - `classifier.rs` / `resolver.rs`: copy ordering and target selection
//! - `gateway.rs`: the appliance seam implemented by the REST client
//! - `directory.rs`: group enumeration and name lookups
//! - `controller.rs`: per-copy image access state machine
//! - `orchestrator.rs`: batch execution with per-group failure isolation
//! - `outcome.rs`: per-group outcomes and the batch report
//! - `error.rs`: error taxonomy

pub mod classifier;
pub mod controller;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod matcher;
pub mod model;
pub mod orchestrator;
pub mod outcome;
pub mod resolver;

pub use classifier::{CopyClass, CopyClassifier};
pub use controller::{
    AccessStateController, PollResult, PollTarget, TransitionPhase, TransitionReport,
    TransitionSettings, TransitionStatus,
};
pub use directory::{ClassifiedCopy, GroupDirectory, GroupStatus};
pub use error::{
    CoreError, CoreResult, GatewayError, GatewayResult, GroupFailure, ResolutionError,
    TransitionError,
};
pub use gateway::{ApplianceGateway, MutationStatus};
pub use matcher::{IdentifierRule, Identifiers, NameMatcher, PatternMatcher, SubstringMatcher};
pub use model::{
    ClusterId, Copy, CopyAddress, CopyId, CopyRole, Direction, GroupId, GroupRef, ImageMode,
    ReplicationGroup, RoleToken, SelectionIntent, Task,
};
pub use orchestrator::{BatchOrchestrator, OrchestratorConfig};
pub use outcome::{BatchReport, GroupOutcome, OutcomeStatus, SkipReason};
pub use resolver::CopyResolver;
