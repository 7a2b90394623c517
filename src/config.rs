//! Application configuration
//!
//! Settings come from an optional JSON file in the platform config directory
//! (`~/.config/flighttracker/config.json` on Linux), then from environment
//! variables, then from command-line flags. Every field has a default, so a
//! missing file is not an error.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::aviationstack::AVIATIONSTACK_BASE_URL;

/// Environment variable holding the aviationstack access key
pub const ENV_API_KEY: &str = "FLIGHTTRACKER_API_KEY";
/// Environment variable overriding the API base URL
pub const ENV_BASE_URL: &str = "FLIGHTTRACKER_BASE_URL";
/// Environment variable overriding the database location
pub const ENV_DATABASE: &str = "FLIGHTTRACKER_DB";

/// Name of the configuration file inside the config directory
const CONFIG_FILE_NAME: &str = "config.json";

/// Name of the database file inside the data directory
const DATABASE_FILE_NAME: &str = "flights.db";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No API key was configured
    #[error("No API key configured. Set FLIGHTTRACKER_API_KEY or add \"api_key\" to the config file")]
    MissingApiKey,

    /// No home directory, so default locations cannot be resolved
    #[error("Could not determine a data directory; pass --db explicitly")]
    NoDataDir,
}

/// Flight tracker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// aviationstack access key
    pub api_key: Option<String>,
    /// Base URL of the flights API
    pub base_url: String,
    /// Number of records the server is asked for
    pub request_limit: u32,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Response read timeout in seconds
    pub read_timeout_secs: u64,
    /// Location of the SQLite flight cache
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: AVIATIONSTACK_BASE_URL.to_string(),
            request_limit: 10,
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
            database_path: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "flighttracker")
}

impl Config {
    /// Loads configuration from the default file and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match project_dirs() {
            Some(dirs) => Self::from_file(&dirs.config_dir().join(CONFIG_FILE_NAME))?,
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok());
        Ok(config)
    }

    /// Reads configuration from a JSON file
    ///
    /// Returns the defaults if the file does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides from a variable lookup (the process environment in
    /// production)
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(path) = get(ENV_DATABASE) {
            self.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the configured API key
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Resolves the database path, falling back to the platform data directory
    /// (`~/.local/share/flighttracker/flights.db` on Linux)
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.database_path {
            return Ok(path.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .ok_or(ConfigError::NoDataDir)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}
