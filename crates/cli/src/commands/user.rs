//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an administrator regardless of email domain
//! tiendita user create -e admin@example.com -n "Admin Name" -r admin
//!
//! # Password from the environment instead of the command line
//! TIENDITA_USER_PASSWORD=... tiendita user create -e ana@example.com -n Ana
//! ```

use thiserror::Error;

use tiendita_core::Role;
use tiendita_server::db;
use tiendita_server::services::auth::{AuthError, AuthService, Registration};

use super::ConnectError;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, user")]
    InvalidRole(String),

    #[error("Could not create user: {0}")]
    Auth(#[from] AuthError),
}

/// Arguments for `user create`.
#[derive(Debug)]
pub struct CreateUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub username: Option<&'a str>,
    pub password: &'a str,
    pub role: &'a str,
}

/// Create a user with an explicit role.
///
/// # Errors
///
/// Returns an error for an unknown role, invalid input, a duplicate
/// email/username or a database failure.
pub async fn create(args: &CreateUser<'_>) -> Result<i64, UserError> {
    let role: Role = args
        .role
        .parse()
        .map_err(|_| UserError::InvalidRole(args.role.to_owned()))?;

    let (config, pool) = super::connect().await?;
    db::run_migrations(&pool).await?;

    tracing::info!("Creating user: {} ({})", args.email, role);

    let user = AuthService::new(&pool, &config.admin_email_domain)
        .register_with_role(
            &Registration {
                name: args.name,
                username: args.username,
                email: args.email,
                password: args.password,
            },
            role,
        )
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );

    Ok(user.id.as_i64())
}
