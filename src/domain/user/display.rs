//! Display-ready projections of users

use serde::Serialize;

use super::entity::{User, UserId};
use super::validation::{escape_markup, format_date, DateTemplate};

/// One rendered table row; text values are already markup-escaped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    pub id: UserId,
    pub photo: Option<String>,
    pub name: String,
    pub email: String,
    pub admin: &'static str,
    pub registered: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            photo: user.photo_ref().map(escape_markup),
            name: escape_markup(user.name().unwrap_or_default()),
            email: escape_markup(user.email().unwrap_or_default()),
            admin: if user.is_admin() { "Yes" } else { "No" },
            registered: format_date(&user.registered_at(), DateTemplate::DayMonthYearTime),
        }
    }
}

/// Counters shown next to the user table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub users: usize,
    pub admins: usize,
}

impl UserStats {
    pub fn from_users<'a>(users: impl IntoIterator<Item = &'a User>) -> Self {
        users.into_iter().fold(Self::default(), |mut stats, user| {
            stats.users += 1;
            if user.is_admin() {
                stats.admins += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::AttributeBag;
    use serde_json::json;

    fn user(value: serde_json::Value) -> User {
        let bag: AttributeBag = value.as_object().cloned().unwrap();
        User::from_attributes(&bag).into_parts().0
    }

    #[test]
    fn test_row_escapes_text() {
        let row = UserRow::from(&user(json!({
            "name": "<b>Ana</b>",
            "email": "ana@x.com",
            "password": "p",
            "isAdmin": true,
            "registeredAt": "2024-03-01",
            "photoRef": "img/a\"b.png",
        })));

        assert_eq!(row.name, "&lt;b&gt;Ana&lt;/b&gt;");
        assert_eq!(row.email, "ana@x.com");
        assert_eq!(row.admin, "Yes");
        assert_eq!(row.registered, "01/03/2024 00:00");
        assert_eq!(row.photo.as_deref(), Some("img/a&quot;b.png"));
        assert_eq!(row.id.as_i64(), 1_709_251_200_000);
    }

    #[test]
    fn test_row_for_incomplete_user() {
        let row = UserRow::from(&user(json!({})));

        assert_eq!(row.name, "");
        assert_eq!(row.admin, "No");
        assert!(row.photo.is_none());
    }

    #[test]
    fn test_stats_counts_admins() {
        let users = vec![
            user(json!({"isAdmin": true, "id": 1})),
            user(json!({"isAdmin": false, "id": 2})),
            user(json!({"isAdmin": true, "id": 3})),
        ];

        let stats = UserStats::from_users(&users);
        assert_eq!(stats, UserStats { users: 3, admins: 2 });
    }
}
