use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::ApiResponse;

/// Error body of the echo handler
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

/// Errors raised by the echo handler
///
/// Each variant carries the HTTP status it is reported with; the same status is
/// repeated in the JSON body.
#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be parsed as JSON
    InvalidJsonBody,
    /// Request body exceeded the configured limit
    PayloadTooLarge,
    /// Path matched but the method is not handled
    MethodNotAllowed,
    /// No route for the path
    NotFound,
    /// Anything unexpected, including panics
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJsonBody => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidJsonBody => "Invalid JSON body",
            ApiError::PayloadTooLarge => "Request body too large",
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::NotFound => "Not found",
            ApiError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(err) => tracing::error!("Worker error: {:#}", err),
            other => tracing::warn!("Worker error: {}", other.message()),
        }

        let body = Json(ErrorBody {
            error: self.message().to_string(),
            status: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

/// Errors raised by the KV handler
///
/// Reported in the `ApiResponse` envelope with `success: false`.
#[derive(Debug)]
pub enum KvError {
    /// No endpoint for this path/method combination
    RouteNotFound { path: String, method: String },
    /// Malformed query string
    InvalidQuery(String),
    /// Store failure or panic
    Internal(anyhow::Error),
}

impl IntoResponse for KvError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Unknown routes are reported as a failed result, hence 400 rather than 404
            KvError::RouteNotFound { path, method } => {
                tracing::warn!("No route for {} {}", method, path);
                (
                    StatusCode::BAD_REQUEST,
                    ApiResponse::failure(
                        "Not Found",
                        format!("Path {} with method {} not found", path, method),
                    ),
                )
            }
            KvError::InvalidQuery(msg) => {
                tracing::warn!("Invalid query: {}", msg);
                (StatusCode::BAD_REQUEST, ApiResponse::failure("Bad Request", msg))
            }
            KvError::Internal(err) => {
                tracing::error!("Error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiResponse::failure("Internal Server Error", err.to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for KvError {
    fn from(err: anyhow::Error) -> Self {
        KvError::Internal(err)
    }
}

impl From<serde_json::Error> for KvError {
    fn from(err: serde_json::Error) -> Self {
        KvError::Internal(err.into())
    }
}

/// Text carried by a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Unknown error".to_string()
    }
}

/// Panic responder for the echo handler
pub fn echo_panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::Internal(anyhow::anyhow!("handler panicked: {}", panic_message(&*payload)))
        .into_response()
}

/// Panic responder for the KV handler
pub fn kv_panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    KvError::Internal(anyhow::anyhow!(panic_message(&*payload))).into_response()
}
