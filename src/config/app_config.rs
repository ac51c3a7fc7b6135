use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::user::ValidationOptions;
use crate::infrastructure::storage::{StorageConfig, StorageType};

/// Prefix of the environment variables overriding file settings,
/// e.g. `USERS__STORAGE__BACKEND=session`
pub const ENV_PREFIX: &str = "USERS";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSettings,
    pub validation: ValidationOptions,
    pub photo: PhotoSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageType,
    pub directory: PathBuf,
    pub collection: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhotoSettings {
    /// Largest accepted upload; unlimited when absent
    pub max_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageType::default(),
            directory: PathBuf::from("data"),
            collection: "users".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl StorageSettings {
    pub fn to_storage_config(&self) -> StorageConfig {
        match self.backend {
            StorageType::Local => StorageConfig::local(self.directory.clone()),
            StorageType::Session => StorageConfig::session(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parses a TOML document, without consulting files or the environment
    pub fn from_toml_str(document: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserField;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.storage.backend, StorageType::Local);
        assert_eq!(config.storage.collection, "users");
        assert_eq!(
            config.storage.to_storage_config(),
            StorageConfig::local("data")
        );
        assert!(config.validation.allow_accented_names);
        assert!(config.validation.is_required(UserField::Email));
        assert_eq!(config.photo.max_bytes, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_from_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [storage]
            backend = "session"
            collection = "members"

            [validation]
            allow_accented_names = false
            required = ["email"]

            [validation.password_policy]
            min_length = 8
            require_digit = true

            [photo]
            max_bytes = 1048576

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.to_storage_config(), StorageConfig::session());
        assert_eq!(config.storage.collection, "members");
        assert!(!config.validation.allow_accented_names);
        assert!(config.validation.is_required(UserField::Email));
        assert!(!config.validation.is_required(UserField::Name));
        assert_eq!(config.validation.password_policy.min_length, Some(8));
        assert!(config.validation.password_policy.require_digit);
        assert_eq!(config.photo.max_bytes, Some(1_048_576));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str("[logging]\nlevel = \"warn\"\n").unwrap();

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.storage.collection, "users");
    }

    #[test]
    fn test_backend_aliases_load() {
        let config = AppConfig::from_toml_str("[storage]\nbackend = \"memory\"\n").unwrap();
        assert_eq!(config.storage.backend, StorageType::Session);

        let config = AppConfig::from_toml_str("[storage]\nbackend = \"file\"\n").unwrap();
        assert_eq!(config.storage.backend, StorageType::Local);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = AppConfig::from_toml_str("[storage]\nbackend = \"postgres\"\n");
        assert!(result.is_err());
    }
}
