//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use solebox_core::{Email, Role, UserId};

/// A storefront account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The caller identified by a verified access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl CurrentUser {
    /// Staff may act on any order or stock record.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Whether this caller may read a resource owned by `owner`.
    #[must_use]
    pub fn can_view(&self, owner: Option<UserId>) -> bool {
        self.is_staff() || owner == Some(self.id)
    }
}
