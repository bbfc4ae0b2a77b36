//! Catalog route handlers (`/api/productos`).

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use tiendita_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, NOT_FOUND_MSG, Result};
use crate::middleware::{OptionalUser, authorize_catalog_write};
use crate::models::product::{NewProduct, ProductChanges, normalize_category};
use crate::routes::extract::{JsonBody, path_id};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive category filter.
    pub categoria: Option<String>,
}

/// List products, newest first.
///
/// GET /api/productos?categoria=...
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let category = query
        .categoria
        .as_deref()
        .map(normalize_category)
        .filter(|c| !c.is_empty());

    let items = ProductRepository::new(state.pool())
        .list(category.as_deref())
        .await?;

    Ok(Json(json!({ "ok": true, "items": items })))
}

/// Show a single product.
///
/// GET /api/productos/{id}
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let id: ProductId = path_id(&id)?;

    let item = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MSG.to_owned()))?;

    Ok(Json(json!({ "ok": true, "item": item })))
}

/// Create a product.
///
/// POST /api/productos
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<Value>> {
    authorize_catalog_write(state.config(), user.as_ref())?;

    let product = NewProduct::from_json(&body)?;
    let created = ProductRepository::new(state.pool()).create(&product).await?;

    tracing::info!(product_id = %created.id, category = %created.category, "Product created");

    Ok(Json(json!({ "ok": true, "id": created.id })))
}

/// Update some fields of a product. PUT and PATCH behave the same.
///
/// PUT/PATCH /api/productos/{id}
pub async fn update(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> Result<Json<Value>> {
    authorize_catalog_write(state.config(), user.as_ref())?;
    let id: ProductId = path_id(&id)?;
    let repo = ProductRepository::new(state.pool());

    // Unknown IDs answer 404 even when the payload is also invalid.
    let changes = ProductChanges::from_json(&body);
    if repo.get_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(NOT_FOUND_MSG.to_owned()));
    }
    let changes = changes?;

    repo.update(id, &changes).await?;

    tracing::info!(product_id = %id, "Product updated");

    Ok(Json(json!({ "ok": true, "msg": "Actualizado" })))
}

/// Delete a product.
///
/// DELETE /api/productos/{id}
pub async fn delete(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    authorize_catalog_write(state.config(), user.as_ref())?;
    let id: ProductId = path_id(&id)?;

    if !ProductRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound(NOT_FOUND_MSG.to_owned()));
    }

    tracing::info!(product_id = %id, "Product deleted");

    Ok(Json(json!({ "ok": true, "msg": "Eliminado" })))
}
