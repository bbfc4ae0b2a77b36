//! Request extractors shared by the JSON API.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::{AppError, INVALID_JSON_MSG, NOT_FOUND_MSG};

/// Parse an ID path segment. A segment that is not an integer names no
/// record, so it is a 404 rather than a 400.
pub fn path_id<T: From<i64>>(raw: &str) -> Result<T, AppError> {
    raw.parse::<i64>()
        .map(T::from)
        .map_err(|_| AppError::NotFound(NOT_FOUND_MSG.to_owned()))
}

/// JSON body extractor that ignores the `Content-Type` header.
///
/// Browser clients of the catalog post JSON with whatever content type their
/// `fetch` call happens to send, so the body is parsed unconditionally.
/// Any failure (unreadable body, malformed JSON, wrong shape) is a 400 with
/// the `"JSON inválido"` message.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| AppError::BadRequest(INVALID_JSON_MSG.to_owned()))?;

        serde_json::from_slice(&bytes).map(Self).map_err(|e| {
            tracing::debug!(error = %e, "Rejected request body");
            AppError::BadRequest(INVALID_JSON_MSG.to_owned())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use serde_json::{Map, Value};

    use super::*;

    async fn extract(body: &str, content_type: Option<&str>) -> Result<Map<String, Value>, AppError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let req = builder.body(Body::from(body.to_owned())).unwrap();
        JsonBody::<Map<String, Value>>::from_request(req, &())
            .await
            .map(|JsonBody(map)| map)
    }

    #[tokio::test]
    async fn test_parses_without_content_type() {
        let map = extract(r#"{"nombre": "Taza"}"#, None).await.unwrap();
        assert_eq!(map["nombre"], "Taza");

        let map = extract(r#"{"precio": 1}"#, Some("text/plain")).await.unwrap();
        assert_eq!(map["precio"], 1);
    }

    #[test]
    fn test_path_id() {
        let id: tiendita_core::ProductId = path_id("42").unwrap();
        assert_eq!(id.as_i64(), 42);

        for raw in ["abc", "", "4.2"] {
            let err = path_id::<tiendita_core::ProductId>(raw).unwrap_err();
            assert_eq!(err.client_message(), NOT_FOUND_MSG);
        }
    }

    #[tokio::test]
    async fn test_rejects_malformed_and_non_objects() {
        for body in ["", "{", "[1, 2]", "\"texto\""] {
            let err = extract(body, Some("application/json")).await.unwrap_err();
            assert_eq!(err.client_message(), INVALID_JSON_MSG, "{body:?}");
        }
    }
}
