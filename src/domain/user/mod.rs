//! User domain
//!
//! This module provides the user entity, its field rules, the builder that
//! validates raw input into entities, and the repository trait.

mod builder;
mod display;
mod entity;
mod field;
mod repository;
mod validation;

pub use builder::{normalize_attributes, registration_instant, UserBuilder, ValidationOptions};
pub use display::{UserRow, UserStats};
pub use entity::{User, UserId};
pub use field::{FieldErrors, UserField, Validated};
pub use repository::{SaveOutcome, UserRepository};
pub use validation::{
    escape_markup, format_date, is_valid_national_id, is_well_formed_email, is_well_formed_name,
    is_well_formed_password, DateTemplate, PasswordPolicy,
};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
