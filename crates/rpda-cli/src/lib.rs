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
#![allow(clippy::redundant_pub_crate)]

//! Operator CLI for enabling and finishing direct image access on RecoverPoint copies.
//!
//! Layout:
//! - `cli.rs`: argument parsing, settings overrides, and command dispatch
//! - `commands/`: command handlers (`list`, `status`, `enable`/`finish`)
//! - `client.rs`: shared context, password resolution, and error types
//! - `output.rs`: table and JSON renderers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
