//! User field rules
//!
//! Pure predicates used by the user builder, plus the markup and date helpers
//! needed to present user attributes.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Letters and spaces, with the Latin-1 accented range
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\x{00C0}-\x{00FA} ]+$").unwrap());

/// Letters and spaces only
static ASCII_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z ]+$").unwrap());

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@([a-zA-Z0-9-]+\.)+[a-zA-Z0-9]{2,4}$").unwrap()
});

const NATIONAL_ID_LENGTH: usize = 11;

/// Returns true if `value` is made only of letters and spaces.
///
/// With `allow_accented`, characters in U+00C0..=U+00FA are accepted too.
pub fn is_well_formed_name(value: &str, allow_accented: bool) -> bool {
    if allow_accented {
        NAME_PATTERN.is_match(value)
    } else {
        ASCII_NAME_PATTERN.is_match(value)
    }
}

/// Returns true if `value` has the `local@domain.tld` shape with a 2-4
/// character top-level segment
pub fn is_well_formed_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Password format policy.
///
/// Every constraint is off by default, so the default policy accepts any
/// password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_special: bool,
}

impl PasswordPolicy {
    /// Policy that accepts any value
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn requiring_digit(mut self) -> Self {
        self.require_digit = true;
        self
    }

    pub fn requiring_mixed_case(mut self) -> Self {
        self.require_lowercase = true;
        self.require_uppercase = true;
        self
    }

    pub fn requiring_special(mut self) -> Self {
        self.require_special = true;
        self
    }
}

/// Returns true if `value` satisfies `policy`
pub fn is_well_formed_password(value: &str, policy: &PasswordPolicy) -> bool {
    let length = value.chars().count();

    if policy.min_length.is_some_and(|min| length < min) {
        return false;
    }

    if policy.max_length.is_some_and(|max| length > max) {
        return false;
    }

    let has = |check: fn(&char) -> bool| value.chars().any(|c| check(&c));

    if policy.require_digit && !has(char::is_ascii_digit) {
        return false;
    }

    if policy.require_lowercase && !has(|c| c.is_lowercase()) {
        return false;
    }

    if policy.require_uppercase && !has(|c| c.is_uppercase()) {
        return false;
    }

    if policy.require_special && !has(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        return false;
    }

    true
}

/// Validates a national ID by its two check digits.
///
/// Non-digits are ignored. Inputs with more than 11 digits, or none at all,
/// are rejected; shorter inputs are left-padded with zeros. Both check digits
/// must match.
pub fn is_valid_national_id(value: &str) -> bool {
    let mut digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.is_empty() || digits.len() > NATIONAL_ID_LENGTH {
        return false;
    }

    let padding = NATIONAL_ID_LENGTH - digits.len();
    digits.splice(0..0, std::iter::repeat(0).take(padding));

    // Reversed, the second check digit sits at 0 and the first at 1
    let reversed: Vec<u32> = digits.into_iter().rev().collect();

    (0..2).all(|check| expected_check_digit(&reversed, check) == reversed[check])
}

/// Sum of each digit after `check` (in reversed order) weighted by its
/// reversed position, times ten, modulo eleven.
///
/// A remainder of ten matches no digit, so such inputs never validate.
fn expected_check_digit(reversed: &[u32], check: usize) -> u32 {
    let sum: u32 = reversed
        .iter()
        .enumerate()
        .skip(check + 1)
        .map(|(position, digit)| digit * position as u32)
        .sum();

    sum * 10 % 11
}

/// Replaces `& < > " '` with their entity equivalents in a single pass
pub fn escape_markup(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }

    escaped
}

/// Display templates for dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateTemplate {
    /// `yyyy-MM-dd`
    #[default]
    Iso,
    /// `dd/MM/yyyy`
    DayMonthYear,
    /// `dd/MM/yyyy hh:mm`
    DayMonthYearTime,
}

impl DateTemplate {
    pub fn from_pattern(pattern: &str) -> Option<Self> {
        match pattern {
            "yyyy-MM-dd" => Some(Self::Iso),
            "dd/MM/yyyy" => Some(Self::DayMonthYear),
            "dd/MM/yyyy hh:mm" => Some(Self::DayMonthYearTime),
            _ => None,
        }
    }

    fn format_str(&self) -> &'static str {
        match self {
            Self::Iso => "%Y-%m-%d",
            Self::DayMonthYear => "%d/%m/%Y",
            Self::DayMonthYearTime => "%d/%m/%Y %H:%M",
        }
    }
}

/// Formats `instant` (UTC) with one of the display templates
pub fn format_date(instant: &DateTime<Utc>, template: DateTemplate) -> String {
    instant.format(template.format_str()).to_string()
}
