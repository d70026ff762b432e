//! Argument parsing, settings overrides, and command dispatch.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use rpda_config::AppConfig;
use rpda_core::{Direction, RoleToken, SelectionIntent};
use rpda_telemetry::{LogFormat, LoggingConfig, init_logging, run_span};
use tracing::{Instrument, debug};
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult, resolve_password};
use crate::commands::{handle_access, handle_list, handle_status};

/// Parses CLI arguments, executes the requested command, and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let run_id = Uuid::new_v4();

    let level = if cli.debug { "debug" } else { "info" };
    if let Err(err) = init_logging(&LoggingConfig {
        level,
        format: cli.log_format,
    }) {
        eprintln!("warning: {err:#}");
    }

    let span = run_span(&run_id.to_string(), cli.command.label());
    match dispatch(cli, run_id).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, run_id: Uuid) -> CliResult<()> {
    let path = rpda_config::resolve_path(cli.config.as_deref());
    debug!(path = %path.display(), "loading configuration");
    let mut config = rpda_config::load(&path)?;
    apply_overrides(&mut config, &cli.overrides);
    rpda_config::validate(&config)?;

    let password = resolve_password(&config, cli.overrides.user.is_some())?;
    let ctx = AppContext::new(config, password, run_id, cli.check, cli.output)?;

    match cli.command {
        Command::List => handle_list(&ctx).await,
        Command::Status(args) => handle_status(&ctx, &args).await,
        Command::Enable(args) => handle_access(&ctx, &args, Direction::Enable).await,
        Command::Finish(args) => handle_access(&ctx, &args, Direction::Disable).await,
    }
}

fn apply_overrides(config: &mut AppConfig, overrides: &Overrides) {
    if let Some(user) = &overrides.user {
        config.api.username.clone_from(user);
        config.api.password = None;
    }
    if let Some(delay) = overrides.delay {
        config.api.delay_secs = delay;
    }
    if let Some(poll_delay) = overrides.poll_delay {
        config.api.poll_delay_secs = poll_delay;
    }
    if let Some(poll_max) = overrides.poll_max {
        config.api.poll_max = poll_max;
    }
}

#[derive(Parser)]
#[command(
    name = "rpda",
    version,
    about = "Enable and finish direct image access on RecoverPoint copies"
)]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "RPDA_CONFIG", help = "Settings file (default: ~/.rpda.json)")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, global = true, help = "Report intended changes without issuing them")]
    pub(crate) check: bool,
    #[arg(long, global = true, help = "Enable debug logging")]
    pub(crate) debug: bool,
    #[command(flatten)]
    pub(crate) overrides: Overrides,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "RPDA_LOG_FORMAT",
        default_value = "pretty",
        help = "Log output format (pretty or json)"
    )]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Per-run overrides of file settings.
#[derive(Args)]
pub(crate) struct Overrides {
    #[arg(long, global = true, help = "Connect as this user and prompt for its password")]
    pub(crate) user: Option<String>,
    #[arg(long, global = true, help = "Seconds to wait between consistency groups")]
    pub(crate) delay: Option<u64>,
    #[arg(long, global = true, help = "Seconds between polling attempts")]
    pub(crate) poll_delay: Option<u64>,
    #[arg(long, global = true, help = "Maximum polling attempts and request retries")]
    pub(crate) poll_max: Option<u32>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List consistency groups.
    List,
    /// Show copies of one or all consistency groups.
    Status(StatusArgs),
    /// Enable image access and direct access on a copy.
    Enable(AccessArgs),
    /// Disable image access and resume replication.
    #[command(alias = "disable")]
    Finish(AccessArgs),
}

impl Command {
    const fn label(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Status(_) => "status",
            Self::Enable(_) => "enable",
            Self::Finish(_) => "finish",
        }
    }
}

#[derive(Args)]
#[command(group(ArgGroup::new("scope").required(true).args(["group", "all"])))]
pub(crate) struct StatusArgs {
    #[arg(long, help = "Consistency group name")]
    pub(crate) group: Option<String>,
    #[arg(long, help = "Every consistency group")]
    pub(crate) all: bool,
}

#[derive(Args)]
#[command(group(ArgGroup::new("scope").required(true).args(["group", "all"])))]
#[command(group(ArgGroup::new("selection").required(true).args(["copy", "test", "dr"])))]
pub(crate) struct AccessArgs {
    #[arg(long, help = "Consistency group name")]
    pub(crate) group: Option<String>,
    #[arg(long, help = "Every consistency group")]
    pub(crate) all: bool,
    #[arg(long, conflicts_with = "all", help = "Exact copy name")]
    pub(crate) copy: Option<String>,
    #[arg(long, help = "Copy matching the test identifier")]
    pub(crate) test: bool,
    #[arg(long, help = "Copy matching the DR identifier")]
    pub(crate) dr: bool,
}

impl AccessArgs {
    pub(crate) fn intent(&self) -> CliResult<SelectionIntent> {
        match (&self.copy, self.test, self.dr) {
            (Some(name), false, false) => Ok(SelectionIntent::Named(name.clone())),
            (None, true, false) => Ok(SelectionIntent::Role(RoleToken::Test)),
            (None, false, true) => Ok(SelectionIntent::Role(RoleToken::Dr)),
            _ => Err(CliError::validation(
                "exactly one of --copy, --test or --dr is required",
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("rpda").chain(args.iter().copied()))
    }

    #[test]
    fn enable_requires_scope_and_selection() {
        assert!(parse(&["enable", "--test"]).is_err());
        assert!(parse(&["enable", "--group", "Test1_CG"]).is_err());
        assert!(parse(&["enable", "--group", "Test1_CG", "--test"]).is_ok());
    }

    #[test]
    fn selection_flags_are_mutually_exclusive() {
        let err = parse(&["enable", "--all", "--test", "--dr"])
            .err()
            .map(|err| err.kind());
        assert_eq!(err, Some(ErrorKind::ArgumentConflict));
    }

    #[test]
    fn copy_cannot_be_combined_with_all() {
        let err = parse(&["finish", "--all", "--copy", "TC_Test1_CG"])
            .err()
            .map(|err| err.kind());
        assert_eq!(err, Some(ErrorKind::ArgumentConflict));
    }

    #[test]
    fn disable_is_an_alias_for_finish() -> Result<(), clap::Error> {
        let cli = parse(&["disable", "--group", "Test1_CG", "--dr", "--check"])?;
        assert!(cli.check);
        let Command::Finish(args) = &cli.command else {
            panic!("expected finish");
        };
        assert!(matches!(
            args.intent(),
            Ok(SelectionIntent::Role(RoleToken::Dr))
        ));
        Ok(())
    }

    #[test]
    fn global_overrides_apply_after_subcommand() -> Result<(), clap::Error> {
        let cli = parse(&[
            "status",
            "--all",
            "--poll-max",
            "5",
            "--user",
            "operator",
            "--output",
            "json",
        ])?;
        assert_eq!(cli.output, OutputFormat::Json);

        let mut config = AppConfig::default();
        config.api.password = Some("stored".to_string());
        apply_overrides(&mut config, &cli.overrides);
        assert_eq!(config.api.poll_max, 5);
        assert_eq!(config.api.username, "operator");
        assert!(config.api.password.is_none());
        Ok(())
    }

    #[test]
    fn overrides_apply_before_the_single_validation() -> Result<(), clap::Error> {
        let cli = parse(&["list", "--poll-max", "5"])?;
        let mut config = AppConfig::default();
        config.api.url = "https://rpa01.example.com/".to_string();
        config.api.username = "admin".to_string();
        config.api.poll_max = 0;
        assert!(rpda_config::validate(&config).is_err());

        apply_overrides(&mut config, &cli.overrides);
        assert!(rpda_config::validate(&config).is_ok());
        Ok(())
    }

    #[test]
    fn log_format_is_parsed_case_insensitively() -> Result<(), clap::Error> {
        assert_eq!(parse(&["list"])?.log_format, LogFormat::Pretty);
        assert_eq!(parse(&["list", "--log-format", "JSON"])?.log_format, LogFormat::Json);
        assert!(parse(&["list", "--log-format", "xml"]).is_err());
        Ok(())
    }

    #[test]
    fn named_copy_becomes_named_intent() -> Result<(), clap::Error> {
        let cli = parse(&["enable", "--group", "Test1_CG", "--copy", "TC_Test1_CG"])?;
        let Command::Enable(args) = &cli.command else {
            panic!("expected enable");
        };
        assert!(matches!(
            args.intent(),
            Ok(SelectionIntent::Named(ref name)) if name == "TC_Test1_CG"
        ));
        Ok(())
    }
}
