//! Key/value backend capability

use std::fmt::Debug;

use crate::domain::DomainError;

/// Minimal key/value capability a collection is persisted through.
///
/// Keys name whole collections; values are opaque serialized blocks.
pub trait KeyValueBackend: Send + Sync + Debug {
    /// Short backend label for logs
    fn kind(&self) -> &'static str;

    /// Whether a block is stored under `key`
    fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get(key)?.is_some())
    }

    /// Reads the block stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Replaces the block stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Removes the block stored under `key`; missing keys are not an error
    fn remove(&self, key: &str) -> Result<(), DomainError>;
}
