//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::TienditaConfig;
use crate::services::auth::AuthService;
use crate::services::payments::{PaymentService, PaymentSimulator};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: TienditaConfig,
    pool: SqlitePool,
    simulator: PaymentSimulator,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `SQLite` connection pool (migrations already applied)
    #[must_use]
    pub fn new(config: TienditaConfig, pool: SqlitePool) -> Self {
        let simulator = PaymentSimulator::new(config.payment_approval_rate);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                simulator,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &TienditaConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the payment simulator.
    #[must_use]
    pub fn simulator(&self) -> &PaymentSimulator {
        &self.inner.simulator
    }

    /// Authentication service bound to this state.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.pool(), &self.inner.config.admin_email_domain)
    }

    /// Payment service bound to this state.
    #[must_use]
    pub fn payments(&self) -> PaymentService<'_> {
        PaymentService::new(self.pool(), self.simulator())
    }
}
