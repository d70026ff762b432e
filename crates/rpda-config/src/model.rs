//! Settings document and its conversion into engine types.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use rpda_core::{IdentifierRule, Identifiers, OrchestratorConfig, TransitionSettings};
use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_DELAY_SECS, DEFAULT_DR_COPY, DEFAULT_POLL_DELAY_SECS, DEFAULT_POLL_MAX,
    DEFAULT_PRODUCTION_NODE, DEFAULT_TEST_COPY, DEFAULT_TIMEOUT_SECS, PLACEHOLDER_URL,
    PLACEHOLDER_USERNAME,
};
use crate::error::{ConfigError, ConfigResult};

/// Root settings document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Appliance connection and pacing.
    pub api: ApiSettings,
    /// Copy naming rules.
    #[serde(default)]
    pub identifiers: IdentifierSettings,
    /// Restrict batches to groups the user administers.
    #[serde(default = "enabled")]
    pub enforce_group_admin: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            identifiers: IdentifierSettings::default(),
            enforce_group_admin: true,
        }
    }
}

const fn enabled() -> bool {
    true
}

/// Appliance connection settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the RecoverPoint management interface.
    pub url: String,
    /// Account used for basic authentication.
    pub username: String,
    /// Password; prompted for when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Seconds to pause between consistency groups.
    #[serde(default = "default_delay")]
    pub delay_secs: u64,
    /// Seconds between polling attempts.
    #[serde(default = "default_poll_delay")]
    pub poll_delay_secs: u64,
    /// Polling and retry budget.
    #[serde(default = "default_poll_max")]
    pub poll_max: u32,
    /// Verify the appliance TLS certificate.
    #[serde(default)]
    pub verify_tls: bool,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

const fn default_delay() -> u64 {
    DEFAULT_DELAY_SECS
}

const fn default_poll_delay() -> u64 {
    DEFAULT_POLL_DELAY_SECS
}

const fn default_poll_max() -> u32 {
    DEFAULT_POLL_MAX
}

const fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: PLACEHOLDER_URL.to_string(),
            username: PLACEHOLDER_USERNAME.to_string(),
            password: None,
            delay_secs: DEFAULT_DELAY_SECS,
            poll_delay_secs: DEFAULT_POLL_DELAY_SECS,
            poll_max: DEFAULT_POLL_MAX,
            verify_tls: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Debug for ApiSettings {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiSettings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("delay_secs", &self.delay_secs)
            .field("poll_delay_secs", &self.poll_delay_secs)
            .field("poll_max", &self.poll_max)
            .field("verify_tls", &self.verify_tls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiSettings {
    /// HTTP request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How identifier rules are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Rules are regular expressions.
    #[default]
    Regexp,
    /// Rules are plain substrings.
    Contains,
}

/// Copy naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierSettings {
    /// Rule interpretation.
    #[serde(default)]
    pub match_mode: MatchMode,
    /// Marks the production copy.
    pub production_node: String,
    /// Marks disaster recovery copies.
    pub dr_copy: String,
    /// Marks test copies.
    pub test_copy: String,
}

impl Default for IdentifierSettings {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Regexp,
            production_node: DEFAULT_PRODUCTION_NODE.to_string(),
            dr_copy: DEFAULT_DR_COPY.to_string(),
            test_copy: DEFAULT_TEST_COPY.to_string(),
        }
    }
}

impl IdentifierSettings {
    /// Build the engine identifier set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] when a rule does not compile in regexp mode.
    pub fn to_identifiers(&self) -> ConfigResult<Identifiers> {
        Ok(Identifiers::new(
            self.rule("production_node", &self.production_node)?,
            self.rule("dr_copy", &self.dr_copy)?,
            self.rule("test_copy", &self.test_copy)?,
        ))
    }

    fn rule(&self, field: &'static str, value: &str) -> ConfigResult<IdentifierRule> {
        match self.match_mode {
            MatchMode::Contains => Ok(IdentifierRule::substring(value)),
            MatchMode::Regexp => IdentifierRule::pattern(value)
                .map_err(|source| ConfigError::InvalidPattern { field, source }),
        }
    }
}

impl AppConfig {
    /// Orchestrator settings derived from the document.
    #[must_use]
    pub const fn orchestrator_config(&self, dry_run: bool) -> OrchestratorConfig {
        OrchestratorConfig {
            transition: TransitionSettings {
                poll_delay: Duration::from_secs(self.api.poll_delay_secs),
                max_attempts: self.api.poll_max,
                dry_run,
            },
            group_delay: Duration::from_secs(self.api.delay_secs),
            enforce_group_admin: self.enforce_group_admin,
        }
    }
}
