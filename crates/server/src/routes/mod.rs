//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (database)
//!
//! # Catalog (JSON)
//! GET    /api/productos                     - Product listing (?categoria=)
//! POST   /api/productos                     - Create product
//! GET    /api/productos/{id}                - Product detail
//! PUT    /api/productos/{id}                - Update product
//! PATCH  /api/productos/{id}                - Update product
//! DELETE /api/productos/{id}                - Delete product
//!
//! # Accounts (JSON)
//! POST /api/registro                        - Register (rate limited)
//! POST /api/login                           - Log in (rate limited)
//! GET  /api/sesion                          - Current user
//!
//! # Payments (JSON)
//! POST   /api/pagos/metodos                 - Add payment method
//! GET    /api/pagos/metodos/{usuario_id}    - Active methods of a user
//! DELETE /api/pagos/metodos/{id}            - Deactivate method
//! POST   /api/pagos/procesar                - Simulated payment
//! GET    /api/pagos/transacciones/{usuario_id} - Transactions of a user
//! GET    /api/pagos/transaccion/{id}        - Transaction detail
//!
//! # Forms (plain text + 303 redirects)
//! GET  /register                            - Registration form description
//! POST /register                            - Register (rate limited)
//! GET  /login                               - Login form description
//! POST /login                               - Log in (rate limited)
//! GET  /logout, POST /logout                - Log out
//! GET  /admin                               - Admin landing (admin session)
//! GET  /tienda                              - Store landing (any session)
//! ```

pub mod accounts;
pub mod auth;
pub mod extract;
pub mod health;
pub mod panel;
pub mod payments;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::TienditaConfig;
use crate::middleware::{auth_rate_limiter, rate_limited_response};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .patch(products::update)
                .delete(products::delete),
        )
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/metodos", post(payments::add_method))
        .route(
            "/metodos/{id}",
            get(payments::list_methods).delete(payments::remove_method),
        )
        .route("/procesar", post(payments::process))
        .route("/transacciones/{id}", get(payments::list_transactions))
        .route("/transaccion/{id}", get(payments::show_transaction))
}

/// Login and registration submissions, behind the per-IP limiter when
/// `rate_limit` is set.
pub fn credential_routes(config: &TienditaConfig) -> Router<AppState> {
    let router = Router::new()
        .route("/api/registro", post(accounts::register))
        .route("/api/login", post(accounts::login))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    if config.rate_limit {
        router
            .layer(auth_rate_limiter(config.trust_proxy))
            .layer(axum::middleware::from_fn(rate_limited_response))
    } else {
        router
    }
}

/// Create the form and landing page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page))
        .route("/login", get(auth::login_page))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/admin", get(panel::admin))
        .route("/tienda", get(panel::store))
}

/// Create all routes.
pub fn routes(config: &TienditaConfig) -> Router<AppState> {
    Router::new()
        // Probes
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        // JSON API
        .nest("/api/productos", product_routes())
        .route("/api/sesion", get(accounts::current))
        .nest("/api/pagos", payment_routes())
        // Forms and landing pages
        .merge(page_routes())
        .merge(credential_routes(config))
}
