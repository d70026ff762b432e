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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (copy/group/identifier builders), appliance.rs (scripted in-memory gateway).

pub mod appliance;
pub mod fixtures;
