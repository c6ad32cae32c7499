use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_OPEN_TIMEOUT_SECS, DEFAULT_PAYLOAD_THRESHOLD_BYTES, DEFAULT_RETENTION_HOURS,
};
use crate::error::ConfigError;

const REGISTER_FILE_NAME: &str = "registers.json";

fn default_payload_threshold_bytes() -> u64 {
    DEFAULT_PAYLOAD_THRESHOLD_BYTES
}

fn default_retention_hours() -> i64 {
    DEFAULT_RETENTION_HOURS
}

fn default_open_timeout_secs() -> u64 {
    DEFAULT_OPEN_TIMEOUT_SECS
}

/// Session store configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// SQLite file backing the object store (required)
    pub database_path: PathBuf,
    /// JSON file backing the durable intent register (default: registers.json next to the database)
    pub register_path: Option<PathBuf>,
    /// Videos larger than this are persisted without their payload (default: 50 MiB)
    #[serde(default = "default_payload_threshold_bytes")]
    pub payload_threshold_bytes: u64,
    /// Age-based sweep retention in hours (default: 24)
    #[serde(default = "default_retention_hours")]
    pub retention_hours: i64,
    /// Seconds to wait for the store to open before running without persistence (default: 5)
    #[serde(default = "default_open_timeout_secs")]
    pub open_timeout_secs: u64,
}

impl StoreConfig {
    /// A config with defaults for everything but the database path
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            register_path: None,
            payload_threshold_bytes: DEFAULT_PAYLOAD_THRESHOLD_BYTES,
            retention_hours: DEFAULT_RETENTION_HOURS,
            open_timeout_secs: DEFAULT_OPEN_TIMEOUT_SECS,
        }
    }

    /// Read, parse and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path must not be empty".to_string()));
        }
        if self.payload_threshold_bytes == 0 {
            return Err(ConfigError::Invalid(
                "payload_threshold_bytes must be greater than 0".to_string(),
            ));
        }
        if self.retention_hours <= 0 {
            return Err(ConfigError::Invalid(format!(
                "retention_hours must be positive, got {}",
                self.retention_hours
            )));
        }
        if self.open_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "open_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Where the durable intent register lives
    pub fn register_path(&self) -> PathBuf {
        match &self.register_path {
            Some(path) => path.clone(),
            None => match self.database_path.parent() {
                Some(dir) => dir.join(REGISTER_FILE_NAME),
                None => PathBuf::from(REGISTER_FILE_NAME),
            },
        }
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_secs(self.open_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: StoreConfig = toml::from_str(r#"database_path = "data/session.sqlite""#).unwrap();
        config.validate().unwrap();

        assert_eq!(config.payload_threshold_bytes, 50 * 1024 * 1024);
        assert_eq!(config.retention_hours, 24);
        assert_eq!(config.open_timeout(), Duration::from_secs(5));
        assert_eq!(config.register_path(), PathBuf::from("data/registers.json"));
    }

    #[test]
    fn test_explicit_register_path() {
        let config: StoreConfig = toml::from_str(
            r#"
            database_path = "session.sqlite"
            register_path = "/var/lib/highlights/intents.json"
            retention_hours = 48
            "#,
        )
        .unwrap();

        assert_eq!(
            config.register_path(),
            PathBuf::from("/var/lib/highlights/intents.json")
        );
        assert_eq!(config.retention_hours, 48);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = StoreConfig::new("session.sqlite");
        config.payload_threshold_bytes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = StoreConfig::new("session.sqlite");
        config.retention_hours = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = StoreConfig::new("session.sqlite");
        config.open_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = StoreConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "database_path = ").unwrap();
        assert!(matches!(
            StoreConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
