//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. JSON handlers return `Result<T, AppError>` and
//! render `{"ok": false, "msg": ...}`; form handlers wrap the same error in
//! [`PlainTextError`] to answer with a plain-text body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::product::ProductInputError;
use crate::services::auth::{AuthError, MIN_PASSWORD_LENGTH};
use crate::services::payments::PaymentError;

/// Message for missing records.
pub const NOT_FOUND_MSG: &str = "No encontrado";

/// Message for requests without a session.
pub const UNAUTHENTICATED_MSG: &str = "No autenticado";

/// Message for requests lacking a required field.
pub const MISSING_FIELDS_MSG: &str = "Faltan campos obligatorios";

/// Message for bodies that are not valid JSON.
pub const INVALID_JSON_MSG: &str = "JSON inválido";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Payment operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Product payload failed validation.
    #[error("Invalid product: {0}")]
    Product(#[from] ProductInputError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Payment(err) => match err {
                PaymentError::UserNotFound
                | PaymentError::MethodNotFound
                | PaymentError::TransactionNotFound => StatusCode::NOT_FOUND,
                PaymentError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Product(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message shown to the client.
    ///
    /// Internal failures never expose their details.
    #[must_use]
    pub fn client_message(&self) -> String {
        if self.status().is_server_error() {
            return "Error interno del servidor".to_owned();
        }

        match self {
            Self::Database(_) => NOT_FOUND_MSG.to_owned(),
            Self::Auth(err) => match err {
                AuthError::MissingFields => MISSING_FIELDS_MSG.to_owned(),
                AuthError::InvalidEmail(_) => "Email inválido".to_owned(),
                AuthError::InvalidUsername(_) | AuthError::UsernameIsForeignEmail => {
                    "Usuario inválido".to_owned()
                }
                AuthError::WeakPassword(_) => format!(
                    "La contraseña debe tener al menos {MIN_PASSWORD_LENGTH} caracteres"
                ),
                AuthError::PasswordMismatch => "Las contraseñas no coinciden".to_owned(),
                AuthError::EmailTaken => "El email ya está registrado".to_owned(),
                AuthError::UsernameTaken => "El usuario ya existe".to_owned(),
                AuthError::InvalidCredentials => "Credenciales inválidas".to_owned(),
                _ => UNAUTHENTICATED_MSG.to_owned(),
            },
            Self::Payment(err) => match err {
                PaymentError::UserNotFound => "Usuario no encontrado".to_owned(),
                PaymentError::MethodNotFound => "Método de pago no encontrado".to_owned(),
                PaymentError::MethodNotUsable => {
                    "Método de pago no válido para este usuario".to_owned()
                }
                PaymentError::TransactionNotFound => "Transacción no encontrada".to_owned(),
                PaymentError::InvalidKind(_) => "Tipo de pago inválido".to_owned(),
                PaymentError::MissingAlias => "Falta el alias".to_owned(),
                PaymentError::InvalidLast4 => "ultimos4 debe tener 4 dígitos".to_owned(),
                _ => "Monto inválido".to_owned(),
            },
            Self::Product(err) => err.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::RateLimited => "Demasiadas solicitudes, intenta más tarde".to_owned(),
        }
    }

    /// Capture server errors to Sentry and the log.
    fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        let status = self.status();
        let body = Json(json!({ "ok": false, "msg": self.client_message() }));
        (status, body).into_response()
    }
}

/// An [`AppError`] rendered as a plain-text body, for form endpoints.
#[derive(Debug)]
pub struct PlainTextError(pub AppError);

impl IntoResponse for PlainTextError {
    fn into_response(self) -> Response {
        self.0.report();
        (self.0.status(), self.0.client_message()).into_response()
    }
}

impl From<AppError> for PlainTextError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for PlainTextError {
    fn from(err: AuthError) -> Self {
        Self(AppError::Auth(err))
    }
}

impl From<RepositoryError> for PlainTextError {
    fn from(err: RepositoryError) -> Self {
        Self(AppError::Database(err))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("payments", "Payment processed", Some(&[("transaction_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tiendita_core::PriceError;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("producto 123".to_string());
        assert_eq!(err.to_string(), "Not found: producto 123");

        let err = AppError::BadRequest("entrada inválida".to_string());
        assert_eq!(err.to_string(), "Bad request: entrada inválida");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("x".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AuthError::EmailTaken.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(PaymentError::MethodNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(PaymentError::InvalidAmount(PriceError::NotPositive).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_json_envelope() {
        let response = AppError::from(ProductInputError::MissingNameOrPrice).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"ok": false, "msg": "Faltan nombre o precio"})
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = AppError::Internal("pool exhausted".to_string()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["msg"], "Error interno del servidor");
    }

    #[tokio::test]
    async fn test_plain_text_rendering() {
        let response = PlainTextError::from(AuthError::UsernameTaken).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], "El usuario ya existe".as_bytes());
    }
}
