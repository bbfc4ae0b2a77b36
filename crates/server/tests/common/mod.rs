//! Shared helpers for router tests.
//!
//! Each test gets its own in-memory database and a fully layered router,
//! driven with `tower::ServiceExt::oneshot`.

#![allow(dead_code, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use tiendita_server::{build_app, config::TienditaConfig, db, state::AppState};

/// Router plus the cookie of the last session it handed out.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    cookie: Option<String>,
}

/// Test configuration: no rate limiting, deterministic payments.
pub fn test_config(approval_rate: f64) -> TienditaConfig {
    TienditaConfig {
        rate_limit: false,
        payment_approval_rate: approval_rate,
        ..TienditaConfig::default()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config(1.0)).await
    }

    pub async fn with_config(config: TienditaConfig) -> Self {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let state = AppState::new(config, pool);
        let router = build_app(state.clone()).await.unwrap();
        Self {
            router,
            state,
            cookie: None,
        }
    }

    /// Send a request, attaching and then remembering the session cookie.
    pub async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_owned());
        }

        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&mut self, method: &str, uri: &str, body: &Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn raw(&mut self, method: &str, uri: &str, body: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
    }

    pub async fn form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{k}={}", encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&mut self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Register through the JSON API and return the new user's ID.
    pub async fn register(&mut self, nombre: &str, usuario: &str, email: &str) -> i64 {
        let response = self
            .json(
                "POST",
                "/api/registro",
                &serde_json::json!({
                    "nombre": nombre,
                    "usuario": usuario,
                    "email": email,
                    "password": "secreto123",
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["usuario"]["id"].as_i64().unwrap()
    }

    pub fn forget_session(&mut self) {
        self.cookie = None;
    }
}

/// Percent-encode the few characters form values in these tests use.
fn encode(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('@', "%40")
        .replace('&', "%26")
        .replace('=', "%3D")
        .replace('+', "%2B")
        .replace(' ', "+")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}
