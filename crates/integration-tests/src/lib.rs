//! End-to-end test harness for Tiendita.
//!
//! [`TestServer::spawn`] serves the real router on an ephemeral port, backed
//! by a private in-memory database, so tests talk plain HTTP with `reqwest`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tiendita-integration-tests
//! ```

use std::net::{Ipv4Addr, SocketAddr};

use reqwest::{Client, redirect::Policy};
use tokio::net::TcpListener;

use tiendita_server::{build_app, config::TienditaConfig, db, state::AppState};

/// A running server bound to `127.0.0.1:<random port>`.
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    /// Start a server with rate limiting off and every payment approved.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    pub async fn spawn() -> Self {
        Self::spawn_with(TienditaConfig {
            rate_limit: false,
            payment_approval_rate: 1.0,
            ..TienditaConfig::default()
        })
        .await
    }

    /// Start a server with a custom configuration. Host, port and database
    /// settings are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be started.
    #[allow(clippy::expect_used)]
    pub async fn spawn_with(config: TienditaConfig) -> Self {
        let pool = db::connect_in_memory()
            .await
            .expect("in-memory database");
        db::run_migrations(&pool).await.expect("migrations");

        let app = build_app(AppState::new(config, pool))
            .await
            .expect("router");

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local address");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        Self { addr }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A client that keeps cookies and does not follow redirects.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }
}
