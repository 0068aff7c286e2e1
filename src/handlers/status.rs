use crate::error::KvError;
use crate::models::{timestamp, ApiResponse, ServiceStatus};
use crate::routes;
use axum::Json;

/// /api/status handler - Liveness report, answered for any method
#[utoipa::path(
    get,
    path = routes::STATUS,
    responses(
        (status = 200, description = "Service is operational", body = ApiResponse)
    ),
    tag = "status"
)]
pub async fn status_handler() -> Result<Json<ApiResponse>, KvError> {
    let response = ApiResponse::ok(ServiceStatus {
        status: "operational".to_string(),
        timestamp: timestamp(),
    })?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{call_json, kv_test_app};
    use crate::kv::testing::FailingStore;
    use crate::routes;
    use axum::http::{Method, StatusCode};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_status_operational() {
        let app = kv_test_app(Arc::new(FailingStore));

        let (status, body) = call_json(&app, Method::GET, routes::STATUS).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "operational");
        assert!(body["data"]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_status_any_method() {
        let app = kv_test_app(Arc::new(FailingStore));

        let (status, body) = call_json(&app, Method::POST, routes::STATUS).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "operational");
    }
}
