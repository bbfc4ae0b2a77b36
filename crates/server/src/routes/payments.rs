//! Payment route handlers (`/api/pagos`).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use tiendita_core::{PaymentMethodId, Price, TransactionId, UserId};

use crate::error::{AppError, MISSING_FIELDS_MSG, Result, add_breadcrumb};
use crate::routes::extract::{JsonBody, path_id};
use crate::services::payments::{MethodInput, PaymentError};
use crate::state::AppState;

/// Payload for registering a payment method.
#[derive(Debug, Deserialize)]
pub struct NewMethodRequest {
    #[serde(default)]
    pub usuario_id: Option<i64>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub ultimos4: Option<String>,
}

/// Payload for processing a payment.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub usuario_id: Option<i64>,
    #[serde(default)]
    pub metodo_id: Option<i64>,
    /// Number or numeric string; validated into a [`Price`].
    #[serde(default)]
    pub monto: Value,
    #[serde(default)]
    pub concepto: Option<String>,
}

fn missing_fields() -> AppError {
    AppError::BadRequest(MISSING_FIELDS_MSG.to_owned())
}

/// POST /api/pagos/metodos
pub async fn add_method(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewMethodRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let user_id = UserId::new(body.usuario_id.ok_or_else(missing_fields)?);

    let method = state
        .payments()
        .add_method(
            user_id,
            MethodInput {
                kind: body.tipo.as_deref().unwrap_or_default(),
                alias: body.alias.as_deref().unwrap_or_default(),
                last4: body.ultimos4.as_deref(),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "metodo": method })),
    ))
}

/// GET /api/pagos/metodos/{usuario_id}
pub async fn list_methods(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let user_id: UserId = path_id(&user_id)?;
    let items = state.payments().list_methods(user_id).await?;
    Ok(Json(json!({ "ok": true, "items": items })))
}

/// Deactivate a payment method. Past transactions keep referencing it.
///
/// DELETE /api/pagos/metodos/{id}
pub async fn remove_method(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: PaymentMethodId = path_id(&id)?;
    state.payments().remove_method(id).await?;

    tracing::info!(method_id = %id, "Payment method deactivated");

    Ok(Json(json!({ "ok": true, "msg": "Eliminado" })))
}

/// Run a payment through the simulator.
///
/// A declined payment is still a 200; `aprobada` tells the outcome.
///
/// POST /api/pagos/procesar
pub async fn process(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ProcessRequest>,
) -> Result<Json<Value>> {
    let user_id = UserId::new(body.usuario_id.ok_or_else(missing_fields)?);
    let method_id = PaymentMethodId::new(body.metodo_id.ok_or_else(missing_fields)?);
    let amount = Price::from_json(&body.monto).map_err(PaymentError::InvalidAmount)?;

    let transaction = state
        .payments()
        .process(
            user_id,
            method_id,
            amount,
            body.concepto.as_deref().unwrap_or_default(),
        )
        .await?;

    let approved = transaction.status.is_approved();
    let transaction_id = transaction.id.to_string();
    add_breadcrumb(
        "payments",
        "Payment processed",
        Some(&[
            ("transaction_id", transaction_id.as_str()),
            ("approved", if approved { "true" } else { "false" }),
        ]),
    );

    Ok(Json(json!({
        "ok": true,
        "aprobada": approved,
        "transaccion": transaction,
    })))
}

/// GET /api/pagos/transacciones/{usuario_id}
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>> {
    let user_id: UserId = path_id(&user_id)?;
    let items = state.payments().list_transactions(user_id).await?;
    Ok(Json(json!({ "ok": true, "items": items })))
}

/// GET /api/pagos/transaccion/{id}
pub async fn show_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: TransactionId = path_id(&id)?;
    let transaction = state.payments().get_transaction(id).await?;
    Ok(Json(json!({ "ok": true, "transaccion": transaction })))
}
