//! Handler 1: basic routing, CORS and JSON echo.

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{timestamp, EchoData, EchoReceived};
use crate::routes;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub const WELCOME: &str = "Welcome to my Cloudflare Worker!";

/// Largest request body `POST /api/data` will buffer
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn router() -> Router<Arc<Config>> {
    Router::new()
        .route(routes::ROOT, any(welcome_handler))
        .route(
            routes::DATA,
            get(get_data_handler)
                .post(post_data_handler)
                .fallback(method_not_allowed_handler),
        )
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// ANY / handler - Plain-text welcome
pub async fn welcome_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], WELCOME)
}

/// GET /api/data handler - Greeting with the current time and environment
///
/// axum routes HEAD to GET handlers; HEAD is not served here.
pub async fn get_data_handler(
    method: Method,
    State(config): State<Arc<Config>>,
) -> Result<Json<EchoData>, ApiError> {
    if method == Method::HEAD {
        return Err(ApiError::MethodNotAllowed);
    }

    Ok(Json(EchoData {
        message: "Hello from the API!".to_string(),
        timestamp: timestamp(),
        environment: config.environment_name().to_string(),
    }))
}

/// POST /api/data handler - Echo the JSON body back
///
/// The body is parsed regardless of `Content-Type`.
pub async fn post_data_handler(
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<EchoReceived>, ApiError> {
    let body = body.map_err(|rejection| {
        tracing::debug!("Failed to read body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidJsonBody
        }
    })?;

    let received: JsonValue = serde_json::from_slice(&body).map_err(|err| {
        tracing::debug!("Rejecting body: {}", err);
        ApiError::InvalidJsonBody
    })?;

    tracing::info!("Received: {}", received);
    Ok(Json(EchoReceived {
        success: true,
        received,
    }))
}

/// /api/data handler for unsupported methods - 405
pub async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Fallback handler for unknown paths - 404
pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}
