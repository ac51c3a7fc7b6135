//! User entity and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::storage::AttributeBag;
use crate::domain::DomainError;

/// User identifier - integer key, by default the registration instant in
/// epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Identity derived from a registration instant
    pub fn from_instant(instant: &DateTime<Utc>) -> Self {
        Self(instant.timestamp_millis())
    }

    /// Parses an integer or a numeric string
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self),
            Value::String(s) => s.trim().parse().ok().map(Self),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Identity as stored in a collection, for lookups
    pub fn to_value(&self) -> Value {
        Value::from(self.0)
    }

    /// The next identity, used to step past a taken one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User entity.
///
/// Built through [`super::UserBuilder`], which validates every field and
/// returns the entity alongside its field errors. Invalid values are kept so
/// that callers can redisplay them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub(super) id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) photo_ref: Option<String>,
    pub(super) is_admin: bool,
    pub(super) registered_at: DateTime<Utc>,
}

impl User {
    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn gender(&self) -> Option<&str> {
        self.gender.as_deref()
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn photo_ref(&self) -> Option<&str> {
        self.photo_ref.as_deref()
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Replaces the photo reference once the upload has been ingested
    pub fn with_photo(mut self, photo_ref: Option<String>) -> Self {
        self.photo_ref = photo_ref;
        self
    }

    /// Serializes to the canonical attribute bag persisted in a collection
    pub fn to_attributes(&self) -> Result<AttributeBag, DomainError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(bag)) => Ok(bag),
            Ok(other) => Err(DomainError::internal(format!(
                "User serialized to a non-object value: {}",
                other
            ))),
            Err(e) => Err(DomainError::internal(format!(
                "Failed to serialize user {}: {}",
                self.id, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn test_user() -> User {
        User {
            id: UserId::new(1_709_251_200_000),
            name: Some("Ana Silva".to_string()),
            gender: Some("F".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17),
            country: None,
            email: Some("ana@x.com".to_string()),
            password: Some("p".to_string()),
            photo_ref: None,
            is_admin: true,
            registered_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_user_id_from_value() {
        assert_eq!(UserId::from_value(&json!(42)), Some(UserId::new(42)));
        assert_eq!(UserId::from_value(&json!(" 42 ")), Some(UserId::new(42)));
        assert_eq!(UserId::from_value(&json!("abc")), None);
        assert_eq!(UserId::from_value(&json!(4.5)), None);
        assert_eq!(UserId::from_value(&Value::Null), None);
    }

    #[test]
    fn test_user_id_from_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(UserId::from_instant(&instant).as_i64(), 1_709_251_200_000);
    }

    #[test]
    fn test_to_attributes_uses_canonical_names() {
        let bag = test_user().to_attributes().unwrap();

        assert_eq!(bag["id"], json!(1_709_251_200_000_i64));
        assert_eq!(bag["name"], json!("Ana Silva"));
        assert_eq!(bag["birthDate"], json!("1990-05-17"));
        assert_eq!(bag["isAdmin"], json!(true));
        assert_eq!(bag["registeredAt"], json!("2024-03-01T00:00:00Z"));
        assert!(!bag.contains_key("country"));
        assert!(!bag.contains_key("photoRef"));
    }

    #[test]
    fn test_with_photo() {
        let user = test_user().with_photo(Some("data:image/png;base64,AAAA".to_string()));
        assert_eq!(user.photo_ref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(user.id(), test_user().id());
    }
}
