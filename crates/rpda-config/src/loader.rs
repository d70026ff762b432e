//! Settings file discovery, template creation, and environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::defaults::{CONFIG_FILE_NAME, ENV_API_PASSWORD, ENV_API_URL, ENV_API_USERNAME};
use crate::error::{ConfigError, ConfigResult};
use crate::model::AppConfig;

/// Settings path: the explicit path when given, otherwise `$HOME/.rpda.json`, otherwise
/// `./.rpda.json`.
#[must_use]
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || {
            env::var_os("HOME")
                .filter(|home| !home.is_empty())
                .map_or_else(
                    || PathBuf::from(CONFIG_FILE_NAME),
                    |home| PathBuf::from(home).join(CONFIG_FILE_NAME),
                )
        },
        Path::to_path_buf,
    )
}

/// Load and override from the process environment.
///
/// # Errors
///
/// See [`load_with_env`].
pub fn load(path: &Path) -> ConfigResult<AppConfig> {
    load_with_env(path, |key| env::var(key).ok())
}

/// Load and override from `lookup`.
///
/// A missing file is replaced by a template and reported as
/// [`ConfigError::TemplateCreated`]. The result is not validated: callers apply their own
/// overrides first and then run `validate` once.
///
/// # Errors
///
/// Returns IO and parse errors.
pub fn load_with_env(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<AppConfig> {
    if !path.exists() {
        write_template(path)?;
        info!(path = %path.display(), "wrote configuration template");
        return Err(ConfigError::TemplateCreated {
            path: path.to_path_buf(),
        });
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read",
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: AppConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    apply_env_overrides(&mut config, lookup);
    debug!(path = %path.display(), api = ?config.api, "loaded configuration");
    Ok(config)
}

/// Write a template with placeholder connection values and shipped defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be written.
pub fn write_template(path: &Path) -> ConfigResult<()> {
    let io_error = |operation: &'static str, source: std::io::Error| ConfigError::Io {
        operation,
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error("config.create_dir", source))?;
    }
    let document = serde_json::to_string_pretty(&AppConfig::default()).map_err(|source| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, document + "\n").map_err(|source| io_error("config.write_template", source))
}

fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let present = |key: &str| lookup(key).filter(|value| !value.is_empty());
    if let Some(url) = present(ENV_API_URL) {
        debug!(variable = ENV_API_URL, "overriding api url from environment");
        config.api.url = url;
    }
    if let Some(username) = present(ENV_API_USERNAME) {
        debug!(variable = ENV_API_USERNAME, "overriding username from environment");
        config.api.username = username;
    }
    if let Some(password) = present(ENV_API_PASSWORD) {
        debug!(variable = ENV_API_PASSWORD, "using password from environment");
        config.api.password = Some(password);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let explicit = Path::new("/etc/rpda/custom.json");
        assert_eq!(resolve_path(Some(explicit)), explicit.to_path_buf());
    }

    #[test]
    fn default_path_ends_with_file_name() {
        assert!(resolve_path(None).ends_with(CONFIG_FILE_NAME));
    }

    #[test]
    fn env_overrides_replace_connection_fields() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            ENV_API_URL => Some("https://rpa.example.com/".to_string()),
            ENV_API_PASSWORD => Some("secret".to_string()),
            ENV_API_USERNAME => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api.url, "https://rpa.example.com/");
        assert_eq!(config.api.password.as_deref(), Some("secret"));
        assert_eq!(config.api.username, "username");
    }
}
