//! Ordered collection persisted as a single block in a key/value backend

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain::set_once::SetOnce;
use crate::domain::DomainError;

use super::backend::KeyValueBackend;
use super::entity::StorageEntity;

/// Generic ordered-collection store over a [`KeyValueBackend`].
///
/// The whole sequence lives under one key and every mutation rewrites it.
/// Positions are the only keys the backend understands; field lookups are
/// linear scans that translate to a position.
#[derive(Debug)]
pub struct KeyValueStore<E>
where
    E: StorageEntity,
{
    name: SetOnce<String>,
    backend: Arc<dyn KeyValueBackend>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> KeyValueStore<E>
where
    E: StorageEntity,
{
    /// Binds a store to `name`, creating an empty collection if absent
    pub fn open(
        name: impl Into<String>,
        backend: Arc<dyn KeyValueBackend>,
    ) -> Result<Self, DomainError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(DomainError::configuration("Collection name cannot be empty"));
        }

        let store = Self {
            name: SetOnce::with_value("collection name", name),
            backend,
            _entity: PhantomData,
        };

        if !store.exists()? {
            debug!(
                collection = store.name(),
                backend = store.backend.kind(),
                "Initializing empty collection"
            );
            store.write(&[])?;
        }

        Ok(store)
    }

    /// The collection name this store is bound to
    pub fn name(&self) -> &str {
        self.name.get().map(String::as_str).unwrap_or_default()
    }

    /// Attempts to rebind the collection name; always rejected once open
    pub fn bind_name(&self, name: impl Into<String>) -> Result<(), DomainError> {
        self.name.set(name.into())
    }

    /// Whether the collection has been initialized in the backend
    pub fn exists(&self) -> Result<bool, DomainError> {
        self.backend.exists(self.name())
    }

    /// Returns the full ordered sequence
    pub fn list_all(&self) -> Result<Vec<E>, DomainError> {
        let Some(block) = self.backend.get(self.name())? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&block)
            .map_err(|e| DomainError::corrupt_collection(self.name(), e.to_string()))
    }

    /// Returns the element at a 0-based position
    pub fn get(&self, position: usize) -> Result<E, DomainError> {
        let records = self.list_all()?;
        let len = records.len();

        records
            .into_iter()
            .nth(position)
            .ok_or_else(|| DomainError::index_out_of_range(position, len))
    }

    /// Position of the first element whose `field` equals `lookup`
    pub fn index_of(&self, lookup: &Value, field: &str) -> Result<Option<usize>, DomainError> {
        self.index_where(|entity| entity.field(field).as_ref() == Some(lookup))
    }

    /// Position of the first element matching `predicate`
    pub fn index_where<F>(&self, predicate: F) -> Result<Option<usize>, DomainError>
    where
        F: Fn(&E) -> bool,
    {
        Ok(self.list_all()?.iter().position(predicate))
    }

    /// Appends an element and returns its position
    pub fn insert(&self, entity: E) -> Result<usize, DomainError> {
        let mut records = self.list_all()?;
        records.push(entity);
        self.write(&records)?;

        let position = records.len() - 1;
        debug!(collection = self.name(), position, "Inserted record");
        Ok(position)
    }

    /// Replaces the element at `position`
    pub fn update(&self, position: usize, entity: E) -> Result<(), DomainError> {
        let mut records = self.list_all()?;
        let len = records.len();

        let slot = records
            .get_mut(position)
            .ok_or_else(|| DomainError::index_out_of_range(position, len))?;
        *slot = entity;

        self.write(&records)?;
        debug!(collection = self.name(), position, "Updated record");
        Ok(())
    }

    /// Removes and returns the element at `position`
    pub fn delete(&self, position: usize) -> Result<E, DomainError> {
        let mut records = self.list_all()?;

        if position >= records.len() {
            return Err(DomainError::index_out_of_range(position, records.len()));
        }

        let removed = records.remove(position);
        self.write(&records)?;
        debug!(collection = self.name(), position, "Deleted record");
        Ok(removed)
    }

    /// Removes the whole collection from the backend
    pub fn clear(&self) -> Result<(), DomainError> {
        debug!(collection = self.name(), "Clearing collection");
        self.backend.remove(self.name())
    }

    pub fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list_all()?.len())
    }

    fn write(&self, records: &[E]) -> Result<(), DomainError> {
        let block = serde_json::to_string(records).map_err(|e| {
            DomainError::internal(format!("Failed to serialize collection: {}", e))
        })?;

        self.backend.set(self.name(), &block)
    }
}
