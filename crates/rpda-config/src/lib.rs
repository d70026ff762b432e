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

//! File-backed settings for the direct image access tool.
//!
//! Layout: `model.rs` (settings document and conversions into engine types),
//! `defaults.rs` (shipped defaults and placeholders), `loader.rs` (path resolution,
//! template creation, environment overrides), `validate.rs` (field checks).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load, load_with_env, resolve_path, write_template};
pub use model::{ApiSettings, AppConfig, IdentifierSettings, MatchMode};
pub use validate::validate;
