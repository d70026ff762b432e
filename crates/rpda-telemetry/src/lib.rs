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

//! Logging setup shared by the rpda binaries.

pub mod init;

pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging, run_span};
