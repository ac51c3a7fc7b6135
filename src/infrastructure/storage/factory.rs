//! Storage factory for runtime backend selection

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::storage::KeyValueBackend;
use crate::domain::DomainError;

use super::file::FileBackend;
use super::in_memory::InMemoryBackend;

/// Supported backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Persistent, directory-backed storage
    #[default]
    #[serde(alias = "file", alias = "disk")]
    Local,
    /// Process-lifetime, in-memory storage
    #[serde(alias = "memory", alias = "in-memory", alias = "in_memory")]
    Session,
}

/// Backend configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Directory-backed storage rooted at the given path
    Local { directory: PathBuf },
    /// In-memory storage
    Session,
}

impl StorageConfig {
    pub fn local(directory: impl Into<PathBuf>) -> Self {
        Self::Local {
            directory: directory.into(),
        }
    }

    pub fn session() -> Self {
        Self::Session
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::Local { .. } => StorageType::Local,
            Self::Session => StorageType::Session,
        }
    }
}

/// Factory for creating backends and the stores bound to them
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates a backend based on the configuration
    pub fn create_backend(config: &StorageConfig) -> Result<Arc<dyn KeyValueBackend>, DomainError> {
        match config {
            StorageConfig::Local { directory } => {
                info!(directory = %directory.display(), "Using local storage backend");
                Ok(Arc::new(FileBackend::open(directory.clone())?))
            }
            StorageConfig::Session => {
                info!("Using session storage backend");
                Ok(Arc::new(InMemoryBackend::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::{AttributeBag, KeyValueStore};
    use serde_json::json;

    fn storage_type(name: &str) -> Result<StorageType, serde_json::Error> {
        serde_json::from_value(json!(name))
    }

    #[test]
    fn test_storage_type_names_and_aliases() {
        assert_eq!(storage_type("local").unwrap(), StorageType::Local);
        assert_eq!(storage_type("file").unwrap(), StorageType::Local);
        assert_eq!(storage_type("session").unwrap(), StorageType::Session);
        assert_eq!(storage_type("memory").unwrap(), StorageType::Session);
        assert_eq!(storage_type("in-memory").unwrap(), StorageType::Session);
        assert!(storage_type("postgres").is_err());
    }

    #[test]
    fn test_storage_config_types() {
        assert_eq!(StorageConfig::session().storage_type(), StorageType::Session);
        assert_eq!(
            StorageConfig::local("/tmp/users").storage_type(),
            StorageType::Local
        );
    }

    #[test]
    fn test_create_session_backend() {
        let backend = StorageFactory::create_backend(&StorageConfig::session()).unwrap();
        let store: KeyValueStore<AttributeBag> = KeyValueStore::open("users", backend).unwrap();

        assert_eq!(store.name(), "users");
        assert!(store.exists().unwrap());
    }

    #[test]
    fn test_create_local_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::local(dir.path());

        let backend = StorageFactory::create_backend(&config).unwrap();
        assert_eq!(backend.kind(), "local");

        let store: KeyValueStore<AttributeBag> = KeyValueStore::open("users", backend).unwrap();
        assert!(store.exists().unwrap());
        assert!(dir.path().join("users.json").is_file());
    }
}
