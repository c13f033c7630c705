use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user account as exposed to the rest of the application and the API.
///
/// Accounts come from local registration (email + password) or from a first
/// Google sign-in (google_id, no password). At least one of the two credential
/// sources is always populated; the password hash is never part of this type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Absent for accounts the provider created without an email claim.
    pub email: Option<String>,
    /// Provider-scoped identifier; set only for Google-linked accounts.
    pub google_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Full stored row, including the password hash. Only the login path sees
/// this; everything else works with [`User`].
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub google_id: Option<String>,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Drops the password hash.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            google_id: self.google_id,
            created_at: self.created_at,
        }
    }
}

/// Fields for creating an account. The store assigns id and created_at.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_user_drops_password_hash() {
        let record = UserRecord {
            id: 7,
            username: "alice".to_string(),
            email: Some("a@x.com".to_string()),
            google_id: None,
            password_hash: Some("$2b$10$abcdefg".to_string()),
            created_at: Utc::now(),
        };

        let user = record.into_user();
        assert_eq!(user.id, 7);
        assert_eq!(user.email.as_deref(), Some("a@x.com"));
        // User has no password_hash field at all; serializing it can never
        // leak the hash.
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
