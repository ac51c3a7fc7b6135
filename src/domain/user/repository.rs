//! User repository trait

use std::fmt::Debug;

use super::entity::{User, UserId};
use super::field::Validated;
use crate::domain::DomainError;

/// How a save was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted { position: usize },
    Updated { position: usize },
}

impl SaveOutcome {
    pub fn position(&self) -> usize {
        match self {
            Self::Inserted { position } | Self::Updated { position } => *position,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

/// Repository trait for user storage.
///
/// Identity is authoritative: saving a user whose id is already stored
/// replaces that record, otherwise the user is appended.
pub trait UserRepository: Send + Sync + Debug {
    /// Inserts or updates by id; users with field errors are refused
    fn save(&self, user: &Validated<User>) -> Result<SaveOutcome, DomainError>;

    /// Deletes the user with `id`; a missing id is `NotFound`
    fn delete(&self, id: UserId) -> Result<(), DomainError>;

    /// All stored users, re-validated on load
    fn list_all(&self) -> Result<Vec<Validated<User>>, DomainError>;

    /// Removes every stored user
    fn clear(&self) -> Result<(), DomainError>;

    fn get(&self, id: UserId) -> Result<Option<Validated<User>>, DomainError> {
        Ok(self
            .list_all()?
            .into_iter()
            .find(|user| user.value().id() == id))
    }

    fn contains(&self, id: UserId) -> Result<bool, DomainError> {
        Ok(self.get(id)?.is_some())
    }

    fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list_all()?.len())
    }
}
