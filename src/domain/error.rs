use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Corrupt collection '{collection}': {message}")]
    CorruptCollection { collection: String, message: String },

    #[error("Index {position} out of range for collection of length {len}")]
    IndexOutOfRange { position: usize, len: usize },

    #[error("Immutable configuration: {message}")]
    ImmutableConfiguration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Photo ingestion error: {message}")]
    PhotoIngestion { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn corrupt_collection(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptCollection {
            collection: collection.into(),
            message: message.into(),
        }
    }

    pub fn index_out_of_range(position: usize, len: usize) -> Self {
        Self::IndexOutOfRange { position, len }
    }

    pub fn immutable_configuration(message: impl Into<String>) -> Self {
        Self::ImmutableConfiguration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn photo_ingestion(message: impl Into<String>) -> Self {
        Self::PhotoIngestion {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
