//! Store configuration loading.
//!
//! # Responsibility
//! - Define the explicit configuration object built once at process start.
//! - Load it from a TOML file and apply environment overrides.
//!
//! # Invariants
//! - Nothing in core reads configuration from ambient globals; services
//!   receive a `StoreConfig` (or values derived from it) at construction.
//! - A loaded config always passes `validate()`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Env var naming the TOML config file to load.
pub const CONFIG_PATH_ENV: &str = "RECNEST_CONFIG";
pub const DB_PATH_ENV: &str = "RECNEST_DB_PATH";
pub const MAX_LIMIT_ENV: &str = "RECNEST_MAX_LIMIT";
pub const VERBOSITY_ENV: &str = "RECNEST_VERBOSITY";
pub const LOG_DIR_ENV: &str = "RECNEST_LOG_DIR";

/// Page size cap applied when nothing else is configured.
pub const DEFAULT_MAX_LIMIT: u32 = 1000;
pub const DEFAULT_VERBOSITY: &str = "warn";
const DEFAULT_DB_FILE_NAME: &str = "recnest.sqlite3";

const KNOWN_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        key: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Process-level settings consumed by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. Relative paths resolve against the working dir.
    pub db_path: PathBuf,
    /// Largest page a single collection listing may return.
    pub max_limit: u32,
    /// Log level: `trace|debug|info|warn|error`.
    pub verbosity: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            max_limit: DEFAULT_MAX_LIMIT,
            verbosity: DEFAULT_VERBOSITY.to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Loads config from `RECNEST_CONFIG` (if set) and the `RECNEST_*` overrides.
    pub fn load() -> ConfigResult<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::read_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads one TOML file without environment overrides.
    pub fn load_from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config = Self::read_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML text. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Applies `RECNEST_*` overrides read through `lookup`.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// clobber the file.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = lookup(DB_PATH_ENV) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(MAX_LIMIT_ENV) {
            self.max_limit =
                value
                    .trim()
                    .parse::<u32>()
                    .map_err(|err| ConfigError::InvalidValue {
                        key: "max_limit",
                        message: format!("`{value}` is not a positive integer: {err}"),
                    })?;
        }
        if let Some(value) = lookup(VERBOSITY_ENV) {
            self.verbosity = value.trim().to_string();
        }
        if let Some(value) = lookup(LOG_DIR_ENV) {
            self.log_dir = Some(PathBuf::from(value));
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_limit",
                message: "must be at least 1".to_string(),
            });
        }
        let level = self.verbosity.trim().to_ascii_lowercase();
        if !KNOWN_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "verbosity",
                message: format!(
                    "unsupported level `{}`; expected trace|debug|info|warn|error",
                    self.verbosity
                ),
            });
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "db_path",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn read_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
