//! User repository for database operations.
//!
//! Email and username columns hold the normalized (lowercase) forms produced
//! by [`Email::parse`] and [`Username::parse`], so plain equality is
//! case-insensitive.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use tiendita_core::{Email, Role, UserId, Username};

use super::{RepositoryError, map_unique_violation};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, name, username, email, role, created_at, updated_at";

/// Row shape of the `users` table without the password hash.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    username: String,
    email: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// User row joined with its password hash, for login.
#[derive(Debug, FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            username,
            email,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Whether this email is already taken, as an email or as a username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?1 OR username = ?1)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Whether this username is already taken, as a username or as an email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_exists(&self, username: &Username) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE username = ?1 OR email = ?1)")
                .bind(username)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Get a user and their password hash by username or email.
    ///
    /// The identifier is matched against both columns after trimming and
    /// lowercasing. An email match wins over a username match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored values are invalid.
    pub async fn get_password_hash(
        &self,
        identifier: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let identifier = identifier.trim().to_lowercase();

        let row = sqlx::query_as::<_, UserWithHashRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users
             WHERE email = ?1 OR username = ?1
             ORDER BY email = ?1 DESC, id
             LIMIT 1"
        ))
        .bind(identifier)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Create a new user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or username already exists;
    /// the detail names the offending column (`users.email` or `users.username`).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (name, username, email, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.role)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        User::try_from(row)
    }
}
