//! Field checks applied after loading and overrides.

use url::Url;

use crate::defaults::{PLACEHOLDER_URL, PLACEHOLDER_USERNAME};
use crate::error::{ConfigError, ConfigResult};
use crate::model::AppConfig;

/// Validate a fully assembled settings document.
///
/// # Errors
///
/// Returns the first problem found: an unedited placeholder, an unparsable URL, an empty
/// or invalid identifier rule, or a zero poll budget or timeout.
pub fn validate(config: &AppConfig) -> ConfigResult<()> {
    if config.api.url == PLACEHOLDER_URL {
        return Err(ConfigError::Placeholder { field: "api.url" });
    }
    if config.api.username == PLACEHOLDER_USERNAME {
        return Err(ConfigError::Placeholder {
            field: "api.username",
        });
    }

    let url = Url::parse(&config.api.url).map_err(|err| invalid("url", err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("url", format!("unsupported scheme '{}'", url.scheme())));
    }
    if config.api.username.trim().is_empty() {
        return Err(invalid("username", "must not be empty".to_string()));
    }
    if config.api.poll_max == 0 {
        return Err(invalid("poll_max", "must be at least 1".to_string()));
    }
    if config.api.timeout_secs == 0 {
        return Err(invalid("timeout_secs", "must be at least 1".to_string()));
    }

    let identifiers = &config.identifiers;
    for (field, value) in [
        ("production_node", &identifiers.production_node),
        ("dr_copy", &identifiers.dr_copy),
        ("test_copy", &identifiers.test_copy),
    ] {
        if value.is_empty() {
            return Err(ConfigError::InvalidField {
                section: "identifiers",
                field,
                message: "must not be empty".to_string(),
            });
        }
    }
    identifiers.to_identifiers()?;
    Ok(())
}

const fn invalid(field: &'static str, message: String) -> ConfigError {
    ConfigError::InvalidField {
        section: "api",
        field,
        message,
    }
}
