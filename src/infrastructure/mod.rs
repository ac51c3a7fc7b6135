//! Infrastructure layer - Storage backends, photo ingestion and services

pub mod logging;
pub mod photo;
pub mod storage;
pub mod user;
