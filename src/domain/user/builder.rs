//! User construction from raw field values

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{User, UserId};
use super::field::{FieldErrors, UserField, Validated};
use super::validation::{
    is_well_formed_email, is_well_formed_name, is_well_formed_password, PasswordPolicy,
};
use crate::domain::set_once::SetOnce;
use crate::domain::storage::AttributeBag;
use crate::domain::DomainError;

/// Marker prefixed to attribute names by older serializers
const INTERNAL_PREFIX: char = '_';

/// Rules applied while building users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Fields that must be present and non-empty
    pub required: Vec<UserField>,
    pub allow_accented_names: bool,
    pub password_policy: PasswordPolicy,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            required: vec![UserField::Password, UserField::Email, UserField::Name],
            allow_accented_names: true,
            password_policy: PasswordPolicy::default(),
        }
    }
}

impl ValidationOptions {
    pub fn is_required(&self, field: UserField) -> bool {
        self.required.contains(&field)
    }
}

/// Accumulates field values and their validation errors.
///
/// Every value is stored even when it fails its rule, so the caller can
/// redisplay it. The id slot is set-once.
#[derive(Debug)]
pub struct UserBuilder<'a> {
    options: &'a ValidationOptions,
    errors: FieldErrors,
    name: Option<String>,
    gender: Option<String>,
    birth_date: Option<NaiveDate>,
    country: Option<String>,
    email: Option<String>,
    password: Option<String>,
    photo_ref: Option<String>,
    is_admin: bool,
    registered_at: Option<DateTime<Utc>>,
    id: SetOnce<UserId>,
}

impl<'a> UserBuilder<'a> {
    pub fn new(options: &'a ValidationOptions) -> Self {
        Self {
            options,
            errors: FieldErrors::new(),
            name: None,
            gender: None,
            birth_date: None,
            country: None,
            email: None,
            password: None,
            photo_ref: None,
            is_admin: false,
            registered_at: None,
            id: SetOnce::new("user identifier"),
        }
    }

    /// Consuming form of [`UserBuilder::apply`]
    pub fn field(mut self, field: UserField, raw: &Value) -> Self {
        self.apply(field, raw);
        self
    }

    /// Validates and stores one raw value
    pub fn apply(&mut self, field: UserField, raw: &Value) {
        if is_falsy(raw) {
            if self.options.is_required(field) {
                self.errors.record(field, field.missing_message());
            }
            self.clear(field);
            return;
        }

        let options = self.options;

        match field {
            UserField::Name => {
                self.name = self.text(field, raw, |s| {
                    is_well_formed_name(s, options.allow_accented_names)
                });
            }
            UserField::Gender => {
                self.gender = self.text(field, raw, |s| s.chars().count() == 1);
            }
            UserField::BirthDate => {
                self.birth_date = parse_calendar_date(raw);
                if self.birth_date.is_none() {
                    self.errors.record(field, field.format_message());
                }
            }
            UserField::Country => self.country = self.text(field, raw, |_| true),
            UserField::Email => self.email = self.text(field, raw, is_well_formed_email),
            UserField::Password => self.password = self.password(raw),
            UserField::PhotoRef => self.photo_ref = self.text(field, raw, |_| true),
            UserField::IsAdmin => self.is_admin = self.flag(field, raw),
            UserField::RegisteredAt => match parse_calendar_date(raw) {
                Some(date) => self.registered_at = Some(utc_midnight(date)),
                None => {
                    self.errors.record(field, field.format_message());
                    self.registered_at = None;
                }
            },
            UserField::Id => match UserId::from_value(raw) {
                Some(id) => {
                    if let Err(e) = self.assign_id(id) {
                        self.errors.record(field, e.to_string());
                    }
                }
                None => self.errors.record(field, field.format_message()),
            },
        }
    }

    /// Assigns the identity; fails if one was already assigned
    pub fn assign_id(&mut self, id: UserId) -> Result<(), DomainError> {
        self.id.set(id)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Finishes construction; a missing registration date means today and a
    /// missing id derives from the registration instant
    pub fn build(self) -> Validated<User> {
        let registered_at = self.registered_at.unwrap_or_else(today_midnight);
        let id = self
            .id
            .into_inner()
            .unwrap_or_else(|| UserId::from_instant(&registered_at));

        let user = User {
            id,
            name: self.name,
            gender: self.gender,
            birth_date: self.birth_date,
            country: self.country,
            email: self.email,
            password: self.password,
            photo_ref: self.photo_ref,
            is_admin: self.is_admin,
            registered_at,
        };

        Validated::new(user, self.errors)
    }

    fn clear(&mut self, field: UserField) {
        match field {
            UserField::Name => self.name = None,
            UserField::Gender => self.gender = None,
            UserField::BirthDate => self.birth_date = None,
            UserField::Country => self.country = None,
            UserField::Email => self.email = None,
            UserField::Password => self.password = None,
            UserField::PhotoRef => self.photo_ref = None,
            UserField::IsAdmin => self.is_admin = false,
            UserField::RegisteredAt => self.registered_at = None,
            UserField::Id => {}
        }
    }

    /// Only string values are checked against `rule`; other values are kept
    /// as their JSON text
    fn text(&mut self, field: UserField, raw: &Value, rule: impl Fn(&str) -> bool) -> Option<String> {
        match raw {
            Value::String(s) => {
                let trimmed = s.trim();
                if !rule(trimmed) {
                    self.errors.record(field, field.format_message());
                }
                Some(trimmed.to_string())
            }
            other => Some(other.to_string()),
        }
    }

    fn password(&mut self, raw: &Value) -> Option<String> {
        let field = UserField::Password;

        match raw {
            Value::String(s) => {
                if !is_well_formed_password(s, &self.options.password_policy) {
                    self.errors.record(field, field.format_message());
                }
                Some(s.clone())
            }
            other => {
                self.errors.record(field, field.format_message());
                Some(other.to_string())
            }
        }
    }

    fn flag(&mut self, field: UserField, raw: &Value) -> bool {
        match raw {
            Value::Bool(b) => *b,
            Value::String(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "on" | "yes" | "1"
            ),
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            _ => {
                self.errors.record(field, field.format_message());
                false
            }
        }
    }
}

impl User {
    /// Builds a user from an attribute bag with the default rules
    pub fn from_attributes(bag: &AttributeBag) -> Validated<User> {
        Self::from_attributes_with(bag, &ValidationOptions::default())
    }

    /// Builds a user from an attribute bag, accepting prefixed and legacy
    /// attribute names
    pub fn from_attributes_with(bag: &AttributeBag, options: &ValidationOptions) -> Validated<User> {
        let bag = normalize_attributes(bag);
        let mut builder = UserBuilder::new(options);

        for field in UserField::ALL {
            builder.apply(field, bag.get(field.as_str()).unwrap_or(&Value::Null));
        }

        builder.build()
    }
}

/// Maps attribute names to their canonical form.
///
/// A single leading `_` is stripped and legacy names are renamed. When both a
/// canonical key and a prefixed or legacy duplicate exist, the canonical key
/// wins. Unknown attributes are dropped.
pub fn normalize_attributes(bag: &AttributeBag) -> AttributeBag {
    let mut canonical = AttributeBag::new();
    let mut aliased = Vec::new();

    for (key, value) in bag {
        let stripped = key.strip_prefix(INTERNAL_PREFIX).unwrap_or(key);

        match UserField::from_attribute(stripped) {
            Some(field) if key == field.as_str() => {
                canonical.insert(key.clone(), value.clone());
            }
            Some(field) => aliased.push((field, value)),
            None => {}
        }
    }

    for (field, value) in aliased {
        canonical
            .entry(field.as_str())
            .or_insert_with(|| value.clone());
    }

    canonical
}

/// The instant a registration date resolves to: UTC midnight of the given
/// day, or of today when absent or unparseable
pub fn registration_instant(raw: Option<&Value>) -> DateTime<Utc> {
    raw.filter(|value| !is_falsy(value))
        .and_then(parse_calendar_date)
        .map(utc_midnight)
        .unwrap_or_else(today_midnight)
}

/// Calendar date from `YYYY-MM-DD`, an RFC 3339 timestamp, or epoch millis
fn parse_calendar_date(raw: &Value) -> Option<NaiveDate> {
    match raw {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|instant| instant.with_timezone(&Utc).date_naive())
            })
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|instant| instant.date_naive()),
        _ => None,
    }
}

fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn today_midnight() -> DateTime<Utc> {
    utc_midnight(Utc::now().date_naive())
}

/// Absent, null, false, zero and the empty string count as "no value"
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
