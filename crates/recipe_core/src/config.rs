//! Store configuration.
//!
//! # Responsibility
//! - Describe where the recipe database lives and how connections behave.
//! - Resolve settings from process environment with stable defaults.
//!
//! # Invariants
//! - `db_path` is never empty.
//! - Environment values that fail to parse are reported, not ignored.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DB_FILE_NAME: &str = "recipes.sqlite3";
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub const ENV_DB_PATH: &str = "RECIPE_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "RECIPE_BUSY_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDbPath,
    InvalidBusyTimeout(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDbPath => write!(f, "{ENV_DB_PATH} cannot be empty"),
            Self::InvalidBusyTimeout(value) => write!(
                f,
                "{ENV_BUSY_TIMEOUT_MS} must be a whole number of milliseconds, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Connection settings for the on-disk recipe store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// How long a blocked writer waits on the file lock before failing.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// Builds a config from `RECIPE_DB_PATH` and `RECIPE_BUSY_TIMEOUT_MS`.
    ///
    /// Unset variables fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            let trimmed = path.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::EmptyDbPath);
            }
            config.db_path = PathBuf::from(trimmed);
        }

        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidBusyTimeout(raw.clone()))?;
            config.busy_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DEFAULT_BUSY_TIMEOUT, DEFAULT_DB_FILE_NAME};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_variables_use_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }

    #[test]
    fn variables_override_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            ("RECIPE_DB_PATH", " /tmp/vegan.db "),
            ("RECIPE_BUSY_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/vegan.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = StoreConfig::from_lookup(lookup_from(&[("RECIPE_DB_PATH", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyDbPath);

        let err = StoreConfig::from_lookup(lookup_from(&[("RECIPE_BUSY_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidBusyTimeout("soon".to_string()));
    }
}
