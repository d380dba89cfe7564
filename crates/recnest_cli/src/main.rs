//! `recnest` command line entry point.
//!
//! # Responsibility
//! - Resolve configuration once, then open the store and run one command.
//! - Print JSON on stdout and map failures to stable exit codes.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use log::error;
use recnest_core::db::{open_db, DbError};
use recnest_core::{init_logging, ConfigError, StoreConfig, StoreError, StoreErrorKind};
use std::fmt::{Display, Formatter};
use std::process::ExitCode;

const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(String),
    Db(DbError),
    Store(StoreError),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Logging(_) => 2,
            Self::Db(_) => 5,
            Self::Store(err) => match err.kind() {
                StoreErrorKind::InvalidArgument => 2,
                StoreErrorKind::NotFound => 3,
                StoreErrorKind::AlreadyExists => 4,
                StoreErrorKind::Storage => 5,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Logging(_) => "logging",
            Self::Db(_) => "storage",
            Self::Store(err) => err.kind().as_str(),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config error: {err}"),
            Self::Logging(message) => write!(f, "logging error: {message}"),
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error kind={} error={err}", err.kind());
            let body = serde_json::json!({
                "error": err.kind(),
                "status": match &err {
                    CliError::Store(store) => store.status_code(),
                    _ => StoreErrorKind::Storage.status_code(),
                },
                "message": err.to_string(),
            });
            eprintln!("{body}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(&cli)?;
    start_logging(&config, cli.verbose)?;

    // `info` must not create a store file as a side effect.
    let output = if matches!(cli.command, Command::Info) && !config.db_path.exists() {
        cli::info(None, &config)
    } else {
        let conn = open_db(&config.db_path)?;
        cli::run(cli.command, &conn, &config)?
    };
    println!("{output:#}");
    Ok(())
}

/// File named by `--config` (or `RECNEST_CONFIG`), then env overrides, then
/// `--db`.
fn resolve_config(cli: &Cli) -> Result<StoreConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = StoreConfig::load_from_path(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => StoreConfig::load()?,
    };
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    config.validate()?;
    Ok(config)
}

fn start_logging(config: &StoreConfig, verbose: u8) -> Result<(), CliError> {
    let level = raise_level(&config.verbosity, verbose);
    let log_dir = match &config.log_dir {
        Some(dir) if dir.is_relative() => Some(
            std::env::current_dir()
                .map_err(|err| CliError::Logging(format!("cannot resolve log_dir: {err}")))?
                .join(dir),
        ),
        other => other.clone(),
    };
    let log_dir = log_dir
        .as_deref()
        .map(|dir| {
            dir.to_str()
                .ok_or_else(|| CliError::Logging("log_dir is not valid UTF-8".to_string()))
        })
        .transpose()?;
    init_logging(level, log_dir).map_err(CliError::Logging)
}

/// Each `-v` moves one step from the configured level toward `trace`.
fn raise_level(configured: &str, verbose: u8) -> &'static str {
    let configured = configured.trim().to_ascii_lowercase();
    let configured = if configured == "warning" { "warn".to_string() } else { configured };
    let base = LEVELS
        .iter()
        .position(|level| *level == configured)
        .unwrap_or(1);
    LEVELS[(base + usize::from(verbose)).min(LEVELS.len() - 1)]
}
