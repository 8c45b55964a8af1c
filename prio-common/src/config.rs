//! Configuration loading
//!
//! Resolution order, highest priority first:
//! 1. Command-line arguments (and their environment fallbacks, see `prio-server`)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing or unparsable TOML file is never fatal: a warning is logged and
//! defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::validation::DEFAULT_POINTS_BUDGET;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Full service configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind, e.g. "127.0.0.1" or "0.0.0.0"
    pub bind_address: String,
    pub port: u16,
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    pub logging: LoggingConfig,
    pub voting: VotingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

/// Voting rules applied to newly created sessions and vote submission
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Points each voter may distribute in a new session
    pub points_budget: u32,
    /// Vote submissions allowed per player per minute
    pub votes_per_minute: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            database_path: default_database_path(),
            logging: LoggingConfig::default(),
            voting: VotingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            points_budget: DEFAULT_POINTS_BUDGET,
            votes_per_minute: 30,
        }
    }
}

/// Values supplied on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl ServerConfig {
    /// Parse a TOML document; absent keys take their defaults
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: ServerConfig = toml::from_str(toml_str)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML (if any) and apply command-line overrides
    pub fn load(overrides: &ConfigOverrides) -> Self {
        let path = overrides.config_path.clone().or_else(default_config_path);

        let mut config = match path {
            Some(path) => Self::load_file_or_default(&path),
            None => {
                warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(overrides);
        config
    }

    fn load_file_or_default(path: &Path) -> Self {
        let toml_str = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                warn!("Config file {} not readable ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_toml_str(&toml_str) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} in {}, using defaults", e, path.display());
                Self::default()
            }
        }
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(bind_address) = &overrides.bind_address {
            self.bind_address = bind_address.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(database_path) = &overrides.database_path {
            self.database_path = database_path.clone();
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.voting.points_budget == 0 {
            return Err(Error::Config("voting.points_budget must be positive".to_string()));
        }
        if self.voting.votes_per_minute == 0 {
            return Err(Error::Config("voting.votes_per_minute must be positive".to_string()));
        }
        Ok(())
    }

    /// "host:port" for binding the listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Platform config file location: `<config dir>/prio/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("prio").join("config.toml"))
}

/// Platform data location for the database, falling back to the working directory
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("prio"))
        .unwrap_or_else(|| PathBuf::from("./prio_data"))
        .join("prio.db")
}
