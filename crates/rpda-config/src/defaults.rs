//! Shipped defaults and template placeholders.
//!
//! # Design
//! - Placeholders are written to a fresh template and rejected at load time until edited.

/// File name looked up in the home directory, then the working directory.
pub const CONFIG_FILE_NAME: &str = ".rpda.json";
/// Placeholder appliance URL written to new templates.
pub const PLACEHOLDER_URL: &str = "https://recoverpoint_fqdn/";
/// Placeholder username written to new templates.
pub const PLACEHOLDER_USERNAME: &str = "username";
/// Seconds to pause between consistency groups in a batch.
pub const DEFAULT_DELAY_SECS: u64 = 0;
/// Seconds between polling attempts.
pub const DEFAULT_POLL_DELAY_SECS: u64 = 3;
/// Polling and retry budget.
pub const DEFAULT_POLL_MAX: u32 = 30;
/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Production copy naming rule.
pub const DEFAULT_PRODUCTION_NODE: &str = "_PN$";
/// DR copy naming rule.
pub const DEFAULT_DR_COPY: &str = "_CN$";
/// Test copy naming rule.
pub const DEFAULT_TEST_COPY: &str = "^TC_";
/// Environment variable overriding the appliance URL.
pub const ENV_API_URL: &str = "RPDA_API_URL";
/// Environment variable overriding the username.
pub const ENV_API_USERNAME: &str = "RPDA_API_USERNAME";
/// Environment variable overriding the password.
pub const ENV_API_PASSWORD: &str = "RPDA_API_PASSWORD";
