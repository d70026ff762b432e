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

//! RecoverPoint REST gateway.
//!
//! Layout: `client.rs` (`RecoverPointClient`, the `ApplianceGateway` implementation),
//! `models.rs` (wire payloads and their mapping onto engine types), `error.rs`
//! (client construction errors).

pub mod client;
pub mod error;
pub mod models;

pub use client::{API_BASE_PATH, ClientOptions, RecoverPointClient};
pub use error::{ApiError, ApiResult};
