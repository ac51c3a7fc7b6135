//! Photo infrastructure - Asynchronous ingestion of user photos

mod loader;

pub use loader::{FilePhotoLoader, PhotoLoader, PhotoSource};

#[cfg(test)]
pub use loader::MockPhotoLoader;
