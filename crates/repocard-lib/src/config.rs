use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::infrastructure::DEFAULT_TIMEOUT;

pub const CONFIG_FILE_NAME: &str = "repocard.toml";
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
pub const DEFAULT_OWNER: &str = "abhisheksrocks";
pub const DEFAULT_NAME: &str = "async_button";
pub const ENV_FILE: &str = ".env";
pub const EXAMPLE_ENV_FILE: &str = ".env.example";
pub const GITHUB_TOKEN_KEY: &str = "GITHUB_TOKEN";

/// Errors that can occur when loading the settings file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },
}

/// Runtime settings, from defaults overlaid with `repocard.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// GraphQL endpoint the query is sent to
    pub endpoint: String,
    /// Owner of the repository to describe
    pub owner: String,
    /// Name of the repository to describe
    pub name: String,
    /// `.env` file loaded before reading the token. Empty disables loading.
    pub env_file: PathBuf,
    /// Example file that must exist when set. Empty disables the check.
    pub example_file: PathBuf,
    /// Environment variable holding the Github token
    pub token_key: String,
    /// Timeout for the whole request
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            owner: DEFAULT_OWNER.to_owned(),
            name: DEFAULT_NAME.to_owned(),
            env_file: PathBuf::from(ENV_FILE),
            example_file: PathBuf::from(EXAMPLE_ENV_FILE),
            token_key: GITHUB_TOKEN_KEY.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ---- TOML wire type ----

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    endpoint: Option<String>,
    owner: Option<String>,
    name: Option<String>,
    env_file: Option<PathBuf>,
    example_file: Option<PathBuf>,
    token_key: Option<String>,
    timeout_secs: Option<u64>,
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read.
    /// Returns [`ConfigError::Parse`] if the file is not valid.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("{} not found, using default settings", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read.
    /// Returns [`ConfigError::Parse`] if the file is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file: SettingsFile =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;

        debug!("Loaded settings from {}", path.display());
        Ok(Self::default().merge(file))
    }

    fn merge(self, file: SettingsFile) -> Self {
        Self {
            endpoint: file.endpoint.unwrap_or(self.endpoint),
            owner: file.owner.unwrap_or(self.owner),
            name: file.name.unwrap_or(self.name),
            env_file: file.env_file.unwrap_or(self.env_file),
            example_file: file.example_file.unwrap_or(self.example_file),
            token_key: file.token_key.unwrap_or(self.token_key),
            timeout: file
                .timeout_secs
                .map_or(self.timeout, Duration::from_secs),
        }
    }

    /// The env file resolved against `dir`, or `None` when disabled.
    #[must_use]
    pub fn env_file_in(&self, dir: &Path) -> Option<PathBuf> {
        resolve_in(dir, &self.env_file)
    }

    /// The example file resolved against `dir`, or `None` when disabled.
    #[must_use]
    pub fn example_file_in(&self, dir: &Path) -> Option<PathBuf> {
        resolve_in(dir, &self.example_file)
    }
}

fn resolve_in(dir: &Path, path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(dir.join(path))
    }
}
