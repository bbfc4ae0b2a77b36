//! Form authentication routes (`/register`, `/login`, `/logout`).
//!
//! These answer in plain text and redirect with 303 after each POST.

use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, PlainTextError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, MIN_PASSWORD_LENGTH, Registration};
use crate::state::AppState;

/// Landing page for administrators.
pub const ADMIN_PATH: &str = "/admin";

/// Landing page for customers.
pub const STORE_PATH: &str = "/tienda";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username or email.
    #[serde(default)]
    pub usuario: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub usuario: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Checked only when the form sends it.
    pub password_confirm: Option<String>,
}

/// Query parameters for the form pages.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub registrado: Option<String>,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Describe the login form.
///
/// GET /login
pub async fn login_page(Query(query): Query<MessageQuery>) -> String {
    let mut page = String::new();
    if query.registrado.as_deref() == Some("1") {
        page.push_str("Registro completado. Ya puedes iniciar sesión.\n\n");
    }
    if let Some(error) = query.error.as_deref().filter(|e| !e.is_empty()) {
        page.push_str(&format!("Error: {error}\n\n"));
    }
    page.push_str(
        "Iniciar sesión\n\
         POST /login (application/x-www-form-urlencoded)\n\
         usuario: nombre de usuario o email\n\
         password: contraseña\n",
    );
    page
}

/// Describe the registration form.
///
/// GET /register
pub async fn register_page(Query(query): Query<MessageQuery>) -> String {
    let mut page = String::new();
    if let Some(error) = query.error.as_deref().filter(|e| !e.is_empty()) {
        page.push_str(&format!("Error: {error}\n\n"));
    }
    page.push_str(&format!(
        "Crear cuenta\n\
         POST /register (application/x-www-form-urlencoded)\n\
         nombre: nombre completo\n\
         usuario: nombre de usuario\n\
         email: correo electrónico\n\
         password: al menos {MIN_PASSWORD_LENGTH} caracteres\n\
         password_confirm: repetir la contraseña (opcional)\n"
    ));
    page
}

/// Handle registration.
///
/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, PlainTextError> {
    // Unlike the JSON API, the form has no email fallback for the username.
    if form.usuario.trim().is_empty() {
        return Err(AuthError::MissingFields.into());
    }

    if form
        .password_confirm
        .as_deref()
        .is_some_and(|confirm| confirm != form.password)
    {
        return Err(AuthError::PasswordMismatch.into());
    }

    let registration = Registration {
        name: &form.nombre,
        username: Some(form.usuario.as_str()),
        email: &form.email,
        password: &form.password,
    };

    let user = state.auth().register(&registration).await?;
    add_breadcrumb("auth", "Form registration", None);
    tracing::debug!(user_id = %user.id, "Registered via form");

    Ok(Redirect::to(&format!("{LOGIN_PATH}?registrado=1")))
}

/// Handle login and send the user to the page for their role.
///
/// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, PlainTextError> {
    let user = match state.auth().login(&form.usuario, &form.password).await {
        Ok(user) => user,
        // A blank form is just a failed login here.
        Err(AuthError::MissingFields) => return Err(AuthError::InvalidCredentials.into()),
        Err(e) => return Err(e.into()),
    };

    let current = CurrentUser::from(&user);
    set_current_user(&session, &current).await.map_err(|e| {
        PlainTextError(AppError::Internal(format!("Failed to set session: {e}")))
    })?;

    set_sentry_user(&user.id, Some(user.username.as_str()));
    add_breadcrumb("auth", "Form login", None);
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Redirect::to(landing_path(&current)))
}

/// Clear the session and go back to the login page.
///
/// GET/POST /logout
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    Redirect::to(LOGIN_PATH).into_response()
}

/// Where a freshly logged-in user lands.
#[must_use]
pub const fn landing_path(user: &CurrentUser) -> &'static str {
    if user.role.is_admin() {
        ADMIN_PATH
    } else {
        STORE_PATH
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tiendita_core::{Role, UserId, Username};

    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            username: Username::parse("luis").unwrap(),
            role,
        }
    }

    #[test]
    fn test_landing_path_by_role() {
        assert_eq!(landing_path(&user(Role::Admin)), ADMIN_PATH);
        assert_eq!(landing_path(&user(Role::User)), STORE_PATH);
    }

    #[tokio::test]
    async fn test_login_page_messages() {
        let page = login_page(Query(MessageQuery {
            error: None,
            registrado: Some("1".to_owned()),
        }))
        .await;
        assert!(page.starts_with("Registro completado"));

        let page = login_page(Query(MessageQuery {
            error: Some("sesion".to_owned()),
            registrado: None,
        }))
        .await;
        assert!(page.starts_with("Error: sesion"));
        assert!(page.contains("usuario"));
    }
}
