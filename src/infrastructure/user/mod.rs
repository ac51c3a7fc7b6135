//! User infrastructure module
//!
//! This module provides the storage-backed user repository and the user
//! service that turns form submissions into stored users.

mod repository;
mod service;

pub use repository::StorageUserRepository;
pub use service::{Submission, UserService};
