//! User fields and field-level error accumulation

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Settable user attributes, by canonical attribute name
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserField {
    Name,
    Gender,
    BirthDate,
    Country,
    Email,
    Password,
    PhotoRef,
    IsAdmin,
    RegisteredAt,
    Id,
}

impl UserField {
    /// All fields, in the order the builder consumes them
    pub const ALL: [UserField; 10] = [
        Self::Name,
        Self::Gender,
        Self::BirthDate,
        Self::Country,
        Self::Email,
        Self::Password,
        Self::PhotoRef,
        Self::IsAdmin,
        Self::RegisteredAt,
        Self::Id,
    ];

    /// Canonical attribute name as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Gender => "gender",
            Self::BirthDate => "birthDate",
            Self::Country => "country",
            Self::Email => "email",
            Self::Password => "password",
            Self::PhotoRef => "photoRef",
            Self::IsAdmin => "isAdmin",
            Self::RegisteredAt => "registeredAt",
            Self::Id => "id",
        }
    }

    /// Resolves a canonical or legacy attribute name
    pub fn from_attribute(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "gender" => Some(Self::Gender),
            "birthDate" | "birth" => Some(Self::BirthDate),
            "country" => Some(Self::Country),
            "email" => Some(Self::Email),
            "password" => Some(Self::Password),
            "photoRef" | "photo" => Some(Self::PhotoRef),
            "isAdmin" | "admin" => Some(Self::IsAdmin),
            "registeredAt" | "registration" | "register" => Some(Self::RegisteredAt),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    /// Message recorded when a required field is missing
    pub fn missing_message(&self) -> &'static str {
        match self {
            Self::Name => "User name is mandatory",
            Self::Gender => "No gender selected",
            Self::BirthDate => "Date of user birth is mandatory",
            Self::Country => "User location is mandatory",
            Self::Email => "User email is mandatory",
            Self::Password => "Password is mandatory",
            Self::PhotoRef => "No user profile image provided",
            Self::IsAdmin => "Field \"Administrator\" must be checked",
            Self::RegisteredAt => "Registration date is mandatory",
            Self::Id => "User identifier is mandatory",
        }
    }

    /// Message recorded when a present value fails its format rule
    pub fn format_message(&self) -> &'static str {
        match self {
            Self::Name => "User name contains invalid characters",
            Self::Gender => "Gender must be a single character code",
            Self::BirthDate => "Date of user birth is not a valid date",
            Self::Country => "User location must be text",
            Self::Email => "Email address contains invalid characters",
            Self::Password => "Password does not fit with the required format",
            Self::PhotoRef => "User profile image reference must be text",
            Self::IsAdmin => "Field \"Administrator\" must be a yes/no value",
            Self::RegisteredAt => "Registration date is not a valid date",
            Self::Id => "User identifier must be an integer",
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to message; a field appears at most once and the last
/// recorded failure wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<UserField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, field: UserField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn get(&self, field: UserField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: UserField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;

        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }

        Ok(())
    }
}

/// A constructed value returned alongside the errors found while building it
#[derive(Debug, Clone)]
pub struct Validated<T> {
    value: T,
    errors: FieldErrors,
}

impl<T> Validated<T> {
    pub fn new(value: T, errors: FieldErrors) -> Self {
        Self { value, errors }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// True iff at least one field failed validation
    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn into_parts(self) -> (T, FieldErrors) {
        (self.value, self.errors)
    }

    /// Keeps the value and errors but transforms the value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validated<U> {
        Validated {
            value: f(self.value),
            errors: self.errors,
        }
    }
}
