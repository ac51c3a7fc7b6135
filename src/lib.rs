//! User Registry
//!
//! A user registration library with:
//! - Field-level validation that accumulates errors instead of failing
//! - JSON collections persisted on pluggable key/value backends
//! - Photo ingestion into embedded data-URIs
//! - Display rows and counters for rendering user tables

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;
pub use infrastructure::logging::init_logging;

use std::sync::Arc;

use domain::DomainError;
use infrastructure::{
    photo::FilePhotoLoader,
    storage::StorageFactory,
    user::{StorageUserRepository, UserService},
};

/// User service over the configured backend
pub type AppUserService = UserService<StorageUserRepository, FilePhotoLoader>;

/// Loads `.env`, then the configuration files and `USERS__*` variables
pub fn load_config() -> Result<AppConfig, DomainError> {
    dotenvy::dotenv().ok();

    AppConfig::load()
        .map_err(|e| DomainError::configuration(format!("Failed to load configuration: {}", e)))
}

/// Wired application components
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub users: AppUserService,
}

/// Opens the configured collection and wires the user service around it
pub fn build_context(config: &AppConfig) -> Result<AppContext, DomainError> {
    let backend = StorageFactory::create_backend(&config.storage.to_storage_config())?;
    let repository = StorageUserRepository::open(
        backend,
        &config.storage.collection,
        config.validation.clone(),
    )?;

    let photos = match config.photo.max_bytes {
        Some(max) => FilePhotoLoader::new().with_max_bytes(max),
        None => FilePhotoLoader::new(),
    };

    tracing::info!(
        backend = ?config.storage.backend,
        collection = %config.storage.collection,
        "User registry ready"
    );

    Ok(AppContext {
        config: config.clone(),
        users: UserService::new(
            Arc::new(repository),
            Arc::new(photos),
            config.validation.clone(),
        ),
    })
}
