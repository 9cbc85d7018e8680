use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::{env, path::PathBuf};
use time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON document holding every record of one origin.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub timeout_secs: u64,
    #[serde(default = "default_expiry_warning_secs")]
    pub expiry_warning_secs: u64,
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::seconds(self.timeout_secs.try_into().unwrap_or(i64::MAX))
    }

    pub fn expiry_warning(&self) -> Duration {
        Duration::seconds(self.expiry_warning_secs.try_into().unwrap_or(i64::MAX))
    }
}

fn default_expiry_warning_secs() -> u64 {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (EVENTHUB__STORAGE__PATH, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("storage.path", "eventhub.json")?
            .set_default("session.timeout_secs", 24 * 60 * 60)?
            .set_default("session.expiry_warning_secs", default_expiry_warning_secs())?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("EVENTHUB")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.storage.path.as_os_str().is_empty() {
            return Err("Storage path must not be empty".to_string());
        }
        if self.session.timeout_secs < 60 {
            return Err("Session timeout must be at least 60 seconds".to_string());
        }
        if self.session.expiry_warning_secs >= self.session.timeout_secs {
            return Err("Session expiry warning must be shorter than the timeout".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: &str, timeout_secs: u64, expiry_warning_secs: u64) -> Config {
        Config {
            storage: StorageConfig { path: path.into() },
            session: SessionConfig {
                timeout_secs,
                expiry_warning_secs,
            },
            observability: ObservabilityConfig::default(),
        }
    }

    #[test]
    fn test_validation_empty_path() {
        assert!(config("", 86400, 300).validate().is_err());
    }

    #[test]
    fn test_validation_short_timeout() {
        assert!(config("eventhub.json", 30, 10).validate().is_err());
    }

    #[test]
    fn test_validation_warning_after_timeout() {
        assert!(config("eventhub.json", 600, 600).validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = config("eventhub.json", 86400, 300);

        assert!(config.validate().is_ok());
        assert_eq!(config.session.timeout(), Duration::hours(24));
        assert_eq!(config.session.expiry_warning(), Duration::minutes(5));
    }

    #[test]
    fn test_load_reads_toml_file() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("eventhub.toml");
        std::fs::write(
            &path,
            "[storage]\npath = \"/tmp/origin.json\"\n\n[session]\ntimeout_secs = 3600\n",
        )
        .unwrap();

        let config = Config::load(Some(path.to_string_lossy().into_owned())).unwrap();

        assert_eq!(config.storage.path, PathBuf::from("/tmp/origin.json"));
        assert_eq!(config.session.timeout(), Duration::hours(1));
        assert_eq!(config.session.expiry_warning_secs, 300);
        assert_eq!(config.observability.log_level, "warn");
    }
}
