//! Domain layer - Core business logic and entities

pub mod error;
pub mod set_once;
pub mod storage;
pub mod user;

pub use error::DomainError;
pub use set_once::SetOnce;
pub use storage::{AttributeBag, KeyValueBackend, KeyValueStore, StorageEntity};
pub use user::{
    FieldErrors, SaveOutcome, User, UserBuilder, UserField, UserId, UserRepository, UserRow,
    UserStats, Validated, ValidationOptions,
};
