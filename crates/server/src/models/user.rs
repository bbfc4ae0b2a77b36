//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tiendita_core::{Email, Role, UserId, Username};

/// A registered account (domain type).
///
/// Serializes to the public user shape; the password hash never leaves the
/// repository.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Login name, lowercase.
    #[serde(rename = "usuario")]
    pub username: Username,
    /// Email address, lowercase.
    pub email: Email,
    /// Role assigned at registration.
    #[serde(rename = "rol")]
    pub role: Role,
    /// When the user was created.
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: Username,
    pub email: Email,
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_json_shape() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(3),
            name: "Ana".to_owned(),
            username: Username::parse("ana").unwrap(),
            email: Email::parse("ana@tecmilenio.mx").unwrap(),
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({
                "id": 3,
                "nombre": "Ana",
                "usuario": "ana",
                "email": "ana@tecmilenio.mx",
                "rol": "admin",
            })
        );
    }
}
