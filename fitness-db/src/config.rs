//! Database configuration module.
//!
//! This module provides configuration loading for the fitness database from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `FITNESS_DATA_DIRECTORY`: Directory holding the seven data files (default: `./fitness_data`)
//! - `FITNESS_FILE_FORMAT`: `legacy` or `checksummed` (default: `legacy`)
//! - `FITNESS_ATOMIC_WRITES`: write each file through a temp file and rename (default: `false`)
//! - `FITNESS_SEED_ON_EMPTY`: seed fixture data when no users exist (default: `true`)
//!
//! # Invariants
//!
//! - `data_directory` is always a valid path (may not exist yet)
//! - Every setting has a default, so `from_env` only fails on malformed values

use std::path::PathBuf;
use std::str::FromStr;

/// Layout of the collection files on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// Bare `<count><records>` payload, byte-compatible with files written by
    /// earlier deployments. No magic, version or checksum.
    #[default]
    Legacy,
    /// The legacy payload framed by a magic number, a format version and a
    /// trailing CRC-32.
    Checksummed,
}

impl FromStr for FileFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "checksummed" => Ok(Self::Checksummed),
            other => Err(ConfigError::InvalidValue {
                name: "FITNESS_FILE_FORMAT".to_string(),
                message: format!("'{other}' is not one of: legacy, checksummed"),
            }),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Checksummed => write!(f, "checksummed"),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Directory where the collection files are stored.
    pub data_directory: PathBuf,
    /// On-disk layout of every collection file.
    pub file_format: FileFormat,
    /// Replace each file through `<name>.tmp` + rename instead of
    /// truncating it in place. Files are still written one after another,
    /// so a crash between two files leaves them out of step.
    pub atomic_writes: bool,
    /// Insert the fixture data when the user collection is empty after
    /// loading.
    pub seed_on_empty: bool,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl DatabaseConfig {
    /// Default data directory.
    pub const DEFAULT_DATA_DIRECTORY: &'static str = "./fitness_data";

    /// Configuration with defaults for everything but the directory.
    #[must_use]
    pub fn new(data_directory: impl Into<PathBuf>) -> Self {
        Self {
            data_directory: data_directory.into(),
            file_format: FileFormat::default(),
            atomic_writes: false,
            seed_on_empty: true,
        }
    }

    #[must_use]
    pub const fn with_file_format(mut self, file_format: FileFormat) -> Self {
        self.file_format = file_format;
        self
    }

    #[must_use]
    pub const fn with_atomic_writes(mut self, atomic_writes: bool) -> Self {
        self.atomic_writes = atomic_writes;
        self
    }

    #[must_use]
    pub const fn with_seed_on_empty(mut self, seed_on_empty: bool) -> Self {
        self.seed_on_empty = seed_on_empty;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_directory = std::env::var("FITNESS_DATA_DIRECTORY")
            .map_or_else(|_| PathBuf::from(Self::DEFAULT_DATA_DIRECTORY), PathBuf::from);

        let file_format = match std::env::var("FITNESS_FILE_FORMAT") {
            Ok(value) => value.parse()?,
            Err(_) => FileFormat::default(),
        };

        Ok(Self {
            data_directory,
            file_format,
            atomic_writes: Self::load_flag("FITNESS_ATOMIC_WRITES", false)?,
            seed_on_empty: Self::load_flag("FITNESS_SEED_ON_EMPTY", true)?,
        })
    }

    /// Load a boolean flag from environment.
    ///
    /// Returns the default if not set.
    fn load_flag(name: &str, default: bool) -> Result<bool, ConfigError> {
        std::env::var(name).map_or(Ok(default), |value| parse_flag(name, &value))
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("'{other}' is not a boolean"),
        }),
    }
}
