//! Logging initialisation primitives.
//!
//! # Design
//! - Single entry point installing an env-filtered `fmt` subscriber, pretty or JSON.
//! - Logs go to stderr so command output on stdout stays machine-readable.

use std::io;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use tracing::{Span, info_span};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default level when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::Pretty,
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable logs.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(format!("unknown log format '{other}' (expected json or pretty)")),
        }
    }
}

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for example,
/// because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}")),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(build_env_filter(config.level))
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
            .map_err(|err| anyhow!("failed to install tracing subscriber: {err}")),
    }
}

/// Root span tying every event of one invocation to its run identifier.
#[must_use]
pub fn run_span(run_id: &str, command: &'static str) -> Span {
    info_span!("run", run_id = %run_id, command)
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
