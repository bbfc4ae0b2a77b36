//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in user (or an admin) in route
//! handlers. Rejections answer `/api/` paths with a JSON error and every
//! other path with a redirect to the login form or a plain-text 403.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::config::TienditaConfig;
use crate::error::{AppError, UNAUTHENTICATED_MSG};
use crate::models::CurrentUser;
use crate::models::session::keys;

/// Path of the login form.
pub const LOGIN_PATH: &str = "/login";

/// Message for authenticated users without the admin role.
pub const FORBIDDEN_MSG: &str = "Acceso restringido a administradores";

/// Extractor that requires a logged-in user.
///
/// If the user is not logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hola, {}", user.username)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a logged-in administrator.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when authentication or a role is required.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Logged in, but not an administrator.
    Forbidden {
        /// Whether to answer with JSON.
        api: bool,
    },
}

impl AuthRejection {
    fn missing_session(parts: &Parts) -> Self {
        if is_api_path(parts) {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "ok": false, "msg": UNAUTHENTICATED_MSG })),
            )
                .into_response(),
            Self::Forbidden { api: true } => (
                StatusCode::FORBIDDEN,
                Json(json!({ "ok": false, "msg": FORBIDDEN_MSG })),
            )
                .into_response(),
            Self::Forbidden { api: false } => (StatusCode::FORBIDDEN, FORBIDDEN_MSG).into_response(),
        }
    }
}

fn is_api_path(parts: &Parts) -> bool {
    parts.uri.path().starts_with("/api/")
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    // Set by SessionManagerLayer
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::missing_session(parts))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)
            .await
            .ok_or_else(|| AuthRejection::missing_session(parts))?;

        if !user.role.is_admin() {
            return Err(AuthRejection::Forbidden {
                api: is_api_path(parts),
            });
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireUser`, this does not reject the request if nobody is logged in.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Check whether `user` may modify the catalog.
///
/// Writes are open unless `catalog_requires_admin` is set.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` without a session and
/// `AppError::Forbidden` for non-admin sessions.
pub fn authorize_catalog_write(
    config: &TienditaConfig,
    user: Option<&CurrentUser>,
) -> Result<(), AppError> {
    if !config.catalog_requires_admin {
        return Ok(());
    }
    match user {
        None => Err(AppError::Unauthorized(UNAUTHENTICATED_MSG.to_owned())),
        Some(user) if !user.role.is_admin() => Err(AppError::Forbidden(FORBIDDEN_MSG.to_owned())),
        Some(_) => Ok(()),
    }
}

/// Helper to set the current user in the session.
///
/// Rotates the session ID first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
