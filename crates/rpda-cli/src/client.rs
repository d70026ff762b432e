//! Shared command context, password resolution, and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::anyhow;
use rpda_api::{ClientOptions, RecoverPointClient};
use rpda_config::{AppConfig, ConfigError};
use rpda_core::Identifiers;
use uuid::Uuid;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { .. } => Self::failure(err),
            other => Self::validation(other.to_string()),
        }
    }
}

/// Everything a command handler needs.
pub(crate) struct AppContext {
    pub(crate) gateway: Arc<RecoverPointClient>,
    pub(crate) config: AppConfig,
    pub(crate) identifiers: Identifiers,
    pub(crate) check: bool,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Build the REST client and identifier rules from validated settings.
    pub(crate) fn new(
        config: AppConfig,
        password: String,
        run_id: Uuid,
        check: bool,
        output: OutputFormat,
    ) -> CliResult<Self> {
        let identifiers = config.identifiers.to_identifiers()?;
        let gateway = RecoverPointClient::new(&ClientOptions {
            base_url: config.api.url.clone(),
            username: config.api.username.clone(),
            password,
            verify_tls: config.api.verify_tls,
            timeout: config.api.timeout(),
            request_id: run_id,
        })
        .map_err(|err| CliError::failure(anyhow!(err)))?;
        Ok(Self {
            gateway: Arc::new(gateway),
            config,
            identifiers,
            check,
            output,
        })
    }
}

/// Password from settings, unless a prompt is forced or none is stored.
pub(crate) fn resolve_password(config: &AppConfig, force_prompt: bool) -> CliResult<String> {
    resolve_password_with(
        config.api.password.as_deref(),
        force_prompt,
        io::stdin().is_terminal(),
        || rpassword::prompt_password(format!("Password for {}: ", config.api.username)),
    )
}

fn resolve_password_with(
    stored: Option<&str>,
    force_prompt: bool,
    interactive: bool,
    prompt: impl FnOnce() -> io::Result<String>,
) -> CliResult<String> {
    if !force_prompt && let Some(value) = stored.filter(|value| !value.is_empty()) {
        return Ok(value.to_string());
    }

    if !interactive {
        return Err(CliError::validation(
            "password required: set api.password or RPDA_API_PASSWORD, or run interactively",
        ));
    }

    let entered = prompt()
        .map_err(|err| CliError::failure(anyhow!("failed to read password from stdin: {err}")))?;
    if entered.is_empty() {
        return Err(CliError::validation("password cannot be empty"));
    }
    Ok(entered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never_prompt() -> io::Result<String> {
        Err(io::Error::other("prompt must not run"))
    }

    #[test]
    fn stored_password_is_used_without_prompt() {
        let password = resolve_password_with(Some("secret"), false, true, never_prompt);
        assert!(matches!(password, Ok(ref value) if value == "secret"));
    }

    #[test]
    fn forced_prompt_ignores_stored_password() {
        let password =
            resolve_password_with(Some("secret"), true, true, || Ok("typed".to_string()));
        assert!(matches!(password, Ok(ref value) if value == "typed"));
    }

    #[test]
    fn missing_password_without_terminal_is_a_validation_error() {
        let err = resolve_password_with(None, false, false, never_prompt)
            .expect_err("no terminal to prompt on");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_prompt_answer_is_rejected() {
        let err = resolve_password_with(None, false, true, || Ok(String::new()))
            .expect_err("empty password");
        assert!(err.display_message().contains("empty"));
    }

    #[test]
    fn config_errors_map_to_exit_codes() {
        let placeholder: CliError = ConfigError::Placeholder { field: "api.url" }.into();
        assert_eq!(placeholder.exit_code(), 2);

        let io: CliError = ConfigError::Io {
            operation: "config.read",
            path: "/nope".into(),
            source: io::Error::other("denied"),
        }
        .into();
        assert_eq!(io.exit_code(), 3);
    }
}
