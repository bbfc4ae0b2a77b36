//! Account JSON API (`/api/registro`, `/api/login`, `/api/sesion`).

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::error::{AppError, Result, add_breadcrumb, set_sentry_user};
use crate::middleware::{RequireUser, set_current_user};
use crate::models::CurrentUser;
use crate::routes::extract::JsonBody;
use crate::services::auth::Registration;
use crate::state::AppState;

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub usuario: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login payload. Either `email` or `usuario` identifies the account.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub usuario: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    fn identifier(&self) -> &str {
        [self.email.as_deref(), self.usuario.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default()
    }
}

/// POST /api/registro
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let registration = Registration {
        name: body.nombre.as_deref().unwrap_or_default(),
        username: body.usuario.as_deref(),
        email: body.email.as_deref().unwrap_or_default(),
        password: body.password.as_deref().unwrap_or_default(),
    };

    let user = state.auth().register(&registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "usuario": user })),
    ))
}

/// Log in and start a session.
///
/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<Value>> {
    let user = state
        .auth()
        .login(body.identifier(), body.password.as_deref().unwrap_or_default())
        .await?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to set session: {e}")))?;

    set_sentry_user(&user.id, Some(user.username.as_str()));
    add_breadcrumb("auth", "API login", None);
    tracing::info!(user_id = %user.id, "User logged in via API");

    Ok(Json(json!({ "ok": true, "usuario": user })))
}

/// The logged-in user, fresh from the database.
///
/// GET /api/sesion
pub async fn current(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<Json<Value>> {
    let user = state.auth().get_user(current.id).await?;
    Ok(Json(json!({ "ok": true, "usuario": user })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_identifier_prefers_email() {
        let req = LoginRequest {
            email: Some("ana@example.com".into()),
            usuario: Some("ana".into()),
            password: None,
        };
        assert_eq!(req.identifier(), "ana@example.com");

        let req = LoginRequest {
            email: Some("  ".into()),
            usuario: Some("ana".into()),
            password: None,
        };
        assert_eq!(req.identifier(), "ana");

        let req = LoginRequest {
            email: None,
            usuario: None,
            password: None,
        };
        assert_eq!(req.identifier(), "");
    }
}
