//! Shared passthrough helpers for the proxy routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::backend::{BackendClient, BackendError, BackendRequest, BackendResponse};

/// `{error}` body with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// 502 for a fallback pass that found no usable backend.
pub fn unavailable(err: &BackendError) -> Response {
    error_response(StatusCode::BAD_GATEWAY, err.to_string())
}

/// 502 for a list route: the empty list under `key` plus the error.
pub fn unavailable_list(key: &str, err: &BackendError) -> Response {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), Value::Array(Vec::new()));
    body.insert("error".to_string(), Value::String(err.to_string()));
    (StatusCode::BAD_GATEWAY, Json(Value::Object(body))).into_response()
}

/// Mirror a backend response: same status, same JSON body.
pub fn passthrough(response: BackendResponse) -> Response {
    if response.body.trim().is_empty() {
        return response.status.into_response();
    }
    match response.json::<Value>() {
        Ok(body) => (response.status, Json(body)).into_response(),
        Err(e) => {
            tracing::warn!(
                "Backend answered HTTP {} with a non-JSON body: {}",
                response.status.as_u16(),
                e
            );
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("Backend returned a non-JSON body: {}", e),
            )
        }
    }
}

/// Send `request` and mirror whatever comes back.
pub async fn forward(backend: &BackendClient, request: BackendRequest) -> Response {
    match backend.fetch(&request).await {
        Ok(response) => passthrough(response),
        Err(e) => unavailable(&e),
    }
}

/// Decode a successful response as `T`.
///
/// Non-success responses are mirrored and undecodable bodies become a 502, so
/// the `Err` side is always a ready-to-send response.
pub fn decode<T: DeserializeOwned>(
    result: Result<BackendResponse, BackendError>,
) -> Result<T, Response> {
    let response = result.map_err(|e| unavailable(&e))?;
    if !response.is_success() {
        return Err(passthrough(response));
    }
    response.json::<T>().map_err(|e| {
        error_response(
            StatusCode::BAD_GATEWAY,
            format!("Backend returned an unexpected payload: {}", e),
        )
    })
}
