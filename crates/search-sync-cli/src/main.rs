// search-sync-cli/src/main.rs
// ============================================================================
// Module: Search Sync CLI Entry Point
// Description: Command dispatcher for sync, range reads, and config checks.
// Purpose: Provide a localized CLI around the sync engine and range reader.
// Dependencies: clap, search-sync-core, search-sync-config, search-sync-providers
// ============================================================================

//! ## Overview
//! `search-sync` runs one incremental sync pass, reads stored rows for a
//! caller-local date range, reports stored coverage, or validates a config
//! file. All user-facing strings are routed through the i18n catalog. Every
//! failure is reported on stderr with a non-zero exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use search_sync_cli::backend::StoreBackend;
use search_sync_cli::backend::open_store;
use search_sync_cli::events::open_event_sink;
use search_sync_cli::i18n::Locale;
use search_sync_cli::i18n::set_locale;
use search_sync_cli::output::RowFormat;
use search_sync_cli::output::render_rows;
use search_sync_cli::source::DeferredSearchConsoleSource;
use search_sync_cli::t;
use search_sync_config::SearchSyncConfig;
use search_sync_config::SourceConfig;
use search_sync_core::AnalysisStore;
use search_sync_core::Clock;
use search_sync_core::RangeReader;
use search_sync_core::SyncEngine;
use search_sync_core::SystemClock;
use search_sync_core::ThreadPacer;
use search_sync_core::date_in_offset;
use search_sync_core::format_report_date;
use search_sync_core::parse_report_date;
use search_sync_providers::DEFAULT_MAX_RESPONSE_BYTES;
use search_sync_providers::SearchConsoleConfig;
use thiserror::Error;
use time::Date;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "SEARCH_SYNC_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "search-sync", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `SEARCH_SYNC_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch every missing reporting day up to yesterday (bounded per run).
    Sync(SyncCommand),
    /// Print stored rows for a date range in the application timezone.
    Read(ReadCommand),
    /// Print the first and last stored dates.
    Coverage(CoverageCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Search Sync configuration file.
    Validate(ConfigArgs),
}

/// Shared config location argument.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Config file path (defaults to `SEARCH_SYNC_CONFIG` or `search-sync.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `sync`.
#[derive(Args, Debug)]
struct SyncCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
}

/// Arguments for `read`.
#[derive(Args, Debug)]
struct ReadCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
    /// First date (YYYY-MM-DD, application timezone).
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    start: Option<Date>,
    /// Last date (YYYY-MM-DD, application timezone).
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    end: Option<Date>,
    /// Emit the column names first.
    #[arg(long, action = ArgAction::SetTrue)]
    header: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatArg::Json)]
    format: FormatArg,
}

/// Arguments for `coverage`.
#[derive(Args, Debug)]
struct CoverageCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

/// Supported output formats for `read`.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum FormatArg {
    /// One JSON array per line.
    Json,
    /// Comma-separated values.
    Csv,
}

impl From<FormatArg> for RowFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Csv => Self::Csv,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Sync(command) => command_sync(&command),
        Commands::Read(command) => command_read(&command),
        Commands::Coverage(command) => command_coverage(&command),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(args) => command_config_validate(&args),
        },
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `sync` command.
fn command_sync(command: &SyncCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    let settings = config
        .sync_settings()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let events = open_event_sink(&config.logging).map_err(|err| {
        let path = config.logging.path.as_deref().unwrap_or_else(|| Path::new("-"));
        CliError::new(t!("logging.open_failed", path = path.display(), error = err))
    })?;
    let store = open_configured_store(&config)?;
    let source = DeferredSearchConsoleSource::new(source_config(&config.source));
    let site = settings.site.clone();
    let engine = SyncEngine::new(settings, store, source, SystemClock, ThreadPacer, events)
        .map_err(|err| CliError::new(t!("sync.failed", error = err)))?;
    let days = engine.run().map_err(|err| CliError::new(t!("sync.failed", error = err)))?;
    write_stdout_line(&t!("sync.completed", days = days, site = site))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `read` command.
fn command_read(command: &ReadCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    let settings = config
        .read_settings()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let today = date_in_offset(SystemClock.now_utc(), settings.application_offset);
    let (default_start, default_end) = config.read.default_range(today);
    let start = command.start.unwrap_or(default_start);
    let end = command.end.unwrap_or(default_end);

    let store = open_configured_store(&config)?;
    let reader = RangeReader::new(store, settings);
    let rows = reader
        .read(start, end, command.header)
        .map_err(|err| CliError::new(t!("store.read_failed", error = err)))?;
    let rendered = render_rows(&rows, command.format.into())
        .map_err(|err| CliError::new(t!("read.encode_failed", error = err)))?;
    write_stdout_bytes(rendered.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `coverage` command.
fn command_coverage(command: &CoverageCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.config.as_deref())?;
    let store = open_configured_store(&config)?;
    let first =
        store.first_date().map_err(|err| CliError::new(t!("store.read_failed", error = err)))?;
    let last =
        store.last_date().map_err(|err| CliError::new(t!("store.read_failed", error = err)))?;
    let message = match (first, last) {
        (Some(first), Some(last)) => t!(
            "coverage.range",
            first = format_report_date(first),
            last = format_report_date(last)
        ),
        _ => t!("coverage.empty"),
    };
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the config validation command.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_deref())?;
    config.resolve().map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Wiring Helpers
// ============================================================================

/// Loads and validates the configuration.
fn load_config(path: Option<&Path>) -> CliResult<SearchSyncConfig> {
    SearchSyncConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Opens the configured storage backend.
fn open_configured_store(config: &SearchSyncConfig) -> CliResult<StoreBackend> {
    open_store(&config.storage).map_err(|err| CliError::new(t!("store.open_failed", error = err)))
}

/// Maps the `[source]` section onto the reporting client configuration.
fn source_config(source: &SourceConfig) -> SearchConsoleConfig {
    SearchConsoleConfig {
        endpoint: source.endpoint.clone(),
        access_token_env: source.access_token_env.clone(),
        timeout_ms: source.timeout_ms,
        user_agent: source.user_agent.clone(),
        allow_http: source.allow_http,
        max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
    }
}

/// Parses a `YYYY-MM-DD` command-line date.
fn parse_date_arg(value: &str) -> Result<Date, String> {
    parse_report_date(value).map_err(|_| t!("read.invalid_date", value = value))
}

/// Resolves the locale from CLI flags and environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)?;
    stdout.flush()
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
