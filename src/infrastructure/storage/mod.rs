//! Storage infrastructure - Backend implementations

mod factory;
mod file;
mod in_memory;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use file::FileBackend;
pub use in_memory::InMemoryBackend;
