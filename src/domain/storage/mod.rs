//! Storage domain - Ordered collections over a pluggable key/value backend

mod backend;
mod collection;
mod entity;

pub use backend::KeyValueBackend;
pub use collection::KeyValueStore;
pub use entity::{AttributeBag, StorageEntity};

#[cfg(test)]
pub use backend::mock;
