//! Router tests for `/api/productos`.

#![allow(clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{TestApp, body_json, test_config};

async fn create(app: &mut TestApp, body: &Value) -> i64 {
    let response = app.json("POST", "/api/productos", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_then_read_returns_same_data() {
    let mut app = TestApp::new().await;
    let id = create(
        &mut app,
        &json!({
            "nombre": "Taza de barro",
            "precio": "149.90",
            "categoria": " Cocina ",
            "imagen": "taza.jpg",
            "descripcion": "Hecha a mano",
        }),
    )
    .await;

    let response = app.get(&format!("/api/productos/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let item = &body["item"];
    assert_eq!(item["id"], id);
    assert_eq!(item["nombre"], "Taza de barro");
    assert_eq!(item["categoria"], "cocina");
    assert_eq!(item["precio"].as_f64(), Some(149.9));
    assert_eq!(item["imagen"], "taza.jpg");
    assert_eq!(item["descripcion"], "Hecha a mano");
    assert!(item.get("created_at").is_none());
}

#[tokio::test]
async fn test_list_is_newest_first_and_filters_by_category() {
    let mut app = TestApp::new().await;
    let first = create(&mut app, &json!({"nombre": "Mantel", "precio": 200, "categoria": "Hogar"})).await;
    let second = create(&mut app, &json!({"nombre": "Taza", "precio": 50, "categoria": "cocina"})).await;
    let third = create(&mut app, &json!({"nombre": "Cojín", "precio": 120, "categoria": "hogar"})).await;

    let body = body_json(app.get("/api/productos").await).await;
    let ids: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![third, second, first]);

    let body = body_json(app.get("/api/productos?categoria=HOGAR").await).await;
    let ids: Vec<i64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![third, first]);

    // An empty filter lists everything
    let body = body_json(app.get("/api/productos?categoria=").await).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_create_defaults_category() {
    let mut app = TestApp::new().await;
    let id = create(&mut app, &json!({"nombre": "Vela", "precio": 35})).await;

    let body = body_json(app.get(&format!("/api/productos/{id}")).await).await;
    assert_eq!(body["item"]["categoria"], "general");
    assert_eq!(body["item"]["imagen"], "");
}

#[tokio::test]
async fn test_create_validation() {
    let mut app = TestApp::new().await;

    for body in [
        json!({"precio": 10}),
        json!({"nombre": "   ", "precio": 10}),
        json!({"nombre": "Vela"}),
        json!({"nombre": "Vela", "precio": null}),
    ] {
        let response = app.json("POST", "/api/productos", &body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(
            body_json(response).await,
            json!({"ok": false, "msg": "Faltan nombre o precio"})
        );
    }

    for precio in [json!("diez"), json!(-5), json!(true)] {
        let response = app
            .json("POST", "/api/productos", &json!({"nombre": "Vela", "precio": precio}))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["msg"], "Precio inválido");
    }
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let mut app = TestApp::new().await;
    let response = app.raw("POST", "/api/productos", "{nombre:").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["msg"], "JSON inválido");

    // Content-Type is not required
    let response = app
        .raw("POST", "/api/productos", r#"{"nombre": "Jarra", "precio": 80}"#)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_changes_only_given_fields() {
    let mut app = TestApp::new().await;
    let id = create(
        &mut app,
        &json!({"nombre": "Taza", "precio": 50, "categoria": "cocina", "descripcion": "Azul"}),
    )
    .await;
    let uri = format!("/api/productos/{id}");

    let response = app.json("PATCH", &uri, &json!({"precio": "55.5"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"ok": true, "msg": "Actualizado"})
    );

    let item = body_json(app.get(&uri).await).await["item"].clone();
    assert_eq!(item["nombre"], "Taza");
    assert_eq!(item["categoria"], "cocina");
    assert_eq!(item["precio"].as_f64(), Some(55.5));
    assert_eq!(item["descripcion"], "Azul");

    // PUT behaves like PATCH; blank nombre is ignored, null descripcion clears
    let response = app
        .json(
            "PUT",
            &uri,
            &json!({"nombre": "", "categoria": "Regalos", "descripcion": null}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let item = body_json(app.get(&uri).await).await["item"].clone();
    assert_eq!(item["nombre"], "Taza");
    assert_eq!(item["categoria"], "regalos");
    assert_eq!(item["descripcion"], "");
}

#[tokio::test]
async fn test_invalid_update_writes_nothing() {
    let mut app = TestApp::new().await;
    let id = create(&mut app, &json!({"nombre": "Taza", "precio": 50})).await;
    let uri = format!("/api/productos/{id}");

    let response = app
        .json("PUT", &uri, &json!({"nombre": "Otra", "precio": null}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["msg"], "Precio inválido");

    let item = body_json(app.get(&uri).await).await["item"].clone();
    assert_eq!(item["nombre"], "Taza");
}

#[tokio::test]
async fn test_missing_product_is_404() {
    let mut app = TestApp::new().await;

    let response = app.get("/api/productos/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({"ok": false, "msg": "No encontrado"})
    );

    // Unknown ID wins over an invalid payload
    let response = app
        .json("PUT", "/api/productos/999", &json!({"precio": "x"}))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/api/productos/abc").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_removes_product() {
    let mut app = TestApp::new().await;
    let id = create(&mut app, &json!({"nombre": "Taza", "precio": 50})).await;
    let uri = format!("/api/productos/{id}");

    let response = app.delete(&uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"ok": true, "msg": "Eliminado"})
    );

    assert_eq!(app.get(&uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.json("PATCH", &uri, &json!({"nombre": "x"})).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.delete(&uri).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_writes_can_require_admin() {
    let mut app = TestApp::with_config(tiendita_server::config::TienditaConfig {
        catalog_requires_admin: true,
        ..test_config(1.0)
    })
    .await;

    let product = json!({"nombre": "Taza", "precio": 50});

    let response = app.json("POST", "/api/productos", &product).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    app.register("Cliente", "cliente", "cliente@example.com").await;
    app.json(
        "POST",
        "/api/login",
        &json!({"usuario": "cliente", "password": "secreto123"}),
    )
    .await;
    let response = app.json("POST", "/api/productos", &product).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.register("Admin", "admin", "admin@tecmilenio.mx").await;
    app.json(
        "POST",
        "/api/login",
        &json!({"email": "admin@tecmilenio.mx", "password": "secreto123"}),
    )
    .await;
    let response = app.json("POST", "/api/productos", &product).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Reads stay public
    app.forget_session();
    assert_eq!(app.get("/api/productos").await.status(), StatusCode::OK);
}
