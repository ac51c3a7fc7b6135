//! In-memory (session-scoped) backend

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::storage::KeyValueBackend;
use crate::domain::DomainError;

/// Thread-safe in-memory backend
///
/// Session-scoped: data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    blocks: RwLock<HashMap<String, String>>,
}

impl InMemoryBackend {
    /// Creates a new empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with blocks
    pub fn with_blocks<I, K, V>(blocks: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            blocks: RwLock::new(
                blocks
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueBackend for InMemoryBackend {
    fn kind(&self) -> &'static str {
        "session"
    }

    fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let blocks = self.blocks.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(blocks.contains_key(key))
    }

    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let blocks = self.blocks.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(blocks.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut blocks = self.blocks.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        blocks.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut blocks = self.blocks.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        blocks.remove(key);
        Ok(())
    }
}
