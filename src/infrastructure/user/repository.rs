//! User repository backed by a key/value collection

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::storage::{AttributeBag, KeyValueBackend, KeyValueStore};
use crate::domain::user::{
    SaveOutcome, User, UserField, UserId, UserRepository, Validated, ValidationOptions,
};
use crate::domain::DomainError;

/// Attribute name older serializers used for the identity
const LEGACY_ID_FIELD: &str = "_id";

/// UserRepository over a [`KeyValueStore`] of attribute bags
#[derive(Debug)]
pub struct StorageUserRepository {
    store: KeyValueStore<AttributeBag>,
    options: ValidationOptions,
}

impl StorageUserRepository {
    pub fn new(store: KeyValueStore<AttributeBag>, options: ValidationOptions) -> Self {
        Self { store, options }
    }

    /// Opens `collection` on `backend`
    pub fn open(
        backend: Arc<dyn KeyValueBackend>,
        collection: &str,
        options: ValidationOptions,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(KeyValueStore::open(collection, backend)?, options))
    }

    pub fn store(&self) -> &KeyValueStore<AttributeBag> {
        &self.store
    }

    /// Position of the record holding `id`, including records still using
    /// the legacy prefixed identity field
    fn position_of(&self, id: UserId) -> Result<Option<usize>, DomainError> {
        let lookup = id.to_value();

        match self.store.index_of(&lookup, UserField::Id.as_str())? {
            Some(position) => Ok(Some(position)),
            None => self.store.index_of(&lookup, LEGACY_ID_FIELD),
        }
    }
}

impl UserRepository for StorageUserRepository {
    fn save(&self, user: &Validated<User>) -> Result<SaveOutcome, DomainError> {
        let id = user.value().id();

        if user.has_errors() {
            warn!(user_id = %id, errors = %user.errors(), "Refusing to save invalid user");
            return Err(DomainError::validation(format!(
                "User {} has invalid fields: {}",
                id,
                user.errors()
            )));
        }

        let attributes = user.value().to_attributes()?;

        let outcome = match self.position_of(id)? {
            Some(position) => {
                self.store.update(position, attributes)?;
                SaveOutcome::Updated { position }
            }
            None => SaveOutcome::Inserted {
                position: self.store.insert(attributes)?,
            },
        };

        info!(
            user_id = %id,
            position = outcome.position(),
            inserted = outcome.is_insert(),
            "Saved user"
        );
        Ok(outcome)
    }

    fn delete(&self, id: UserId) -> Result<(), DomainError> {
        let position = self
            .position_of(id)?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        self.store.delete(position)?;
        info!(user_id = %id, position, "Deleted user");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Validated<User>>, DomainError> {
        let users: Vec<Validated<User>> = self
            .store
            .list_all()?
            .iter()
            .map(|bag| User::from_attributes_with(bag, &self.options))
            .collect();

        let invalid = users.iter().filter(|user| user.has_errors()).count();
        if invalid > 0 {
            warn!(
                collection = self.store.name(),
                invalid, "Stored users failed validation on load"
            );
        }

        debug!(collection = self.store.name(), count = users.len(), "Listed users");
        Ok(users)
    }

    fn clear(&self) -> Result<(), DomainError> {
        info!(collection = self.store.name(), "Clearing users");
        self.store.clear()
    }

    fn get(&self, id: UserId) -> Result<Option<Validated<User>>, DomainError> {
        match self.position_of(id)? {
            Some(position) => {
                let bag = self.store.get(position)?;
                Ok(Some(User::from_attributes_with(&bag, &self.options)))
            }
            None => Ok(None),
        }
    }

    fn count(&self) -> Result<usize, DomainError> {
        self.store.count()
    }
}
