//! Authentication service.
//!
//! Password registration and login shared by the JSON API and the form
//! endpoints. Roles are assigned at registration from the email domain.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use tiendita_core::{Email, Role, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw registration input, before validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registration<'r> {
    /// Display name.
    pub name: &'r str,
    /// Login name; the email is used when absent or blank.
    pub username: Option<&'r str>,
    /// Email address.
    pub email: &'r str,
    /// Plain-text password.
    pub password: &'r str,
}

/// Authentication service.
///
/// Handles user registration and password login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    admin_email_domain: &'a str,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    ///
    /// Users registering with an email in `admin_email_domain` become admins.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, admin_email_domain: &'a str) -> Self {
        Self {
            users: UserRepository::new(pool),
            admin_email_domain,
        }
    }

    /// Register a new user, deriving the role from the email domain.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if name, email or password is blank.
    /// Returns `AuthError::InvalidEmail` / `AuthError::InvalidUsername` on bad formats.
    /// Returns `AuthError::UsernameIsForeignEmail` for an `@` username other than the email.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::EmailTaken` / `AuthError::UsernameTaken` on duplicates.
    pub async fn register(&self, registration: &Registration<'_>) -> Result<User, AuthError> {
        self.create_user(registration, None).await
    }

    /// Register a user with an explicit role (administrative tooling).
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register`].
    pub async fn register_with_role(
        &self,
        registration: &Registration<'_>,
        role: Role,
    ) -> Result<User, AuthError> {
        self.create_user(registration, Some(role)).await
    }

    async fn create_user(
        &self,
        registration: &Registration<'_>,
        role: Option<Role>,
    ) -> Result<User, AuthError> {
        let name = registration.name.trim();
        if name.is_empty() || registration.email.trim().is_empty() || registration.password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }

        let email = Email::parse(registration.email)?;
        let username = match registration.username.map(str::trim).filter(|u| !u.is_empty()) {
            Some(username) => Username::parse(username)?,
            None => Username::try_from(&email)?,
        };
        // Logins accept either column, so an address-shaped username must be
        // the account's own email.
        if username.as_str().contains('@') && username.as_str() != email.as_str() {
            return Err(AuthError::UsernameIsForeignEmail);
        }

        validate_password(registration.password)?;

        if self.users.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.users.username_exists(&username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let role = role.unwrap_or_else(|| role_for_email(&email, self.admin_email_domain));
        let password_hash = hash_password(registration.password)?;

        let new_user = NewUser {
            name: name.to_owned(),
            username,
            email,
            role,
        };

        // A concurrent registration can still win the race for the same email.
        let user = self
            .users
            .create(&new_user, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(detail) if detail.contains("users.email") => {
                    AuthError::EmailTaken
                }
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(user)
    }

    /// Login with a username or email and a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either value is blank.
    /// Returns `AuthError::InvalidCredentials` if the user/password is wrong.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, AuthError> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let (user, password_hash) = self
            .users
            .get_password_hash(identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Role granted to a new account with this email.
#[must_use]
pub fn role_for_email(email: &Email, admin_email_domain: &str) -> Role {
    if email.is_in_domain(admin_email_domain) {
        Role::Admin
    } else {
        Role::User
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
