use crate::error::KvError;
use crate::kv::{get_json, put_json};
use crate::models::{ApiResponse, DemoData, StoredData};
use crate::routes::{self, PRODUCTS_KEY, USERS_KEY};
use crate::state::AppState;
use crate::handlers::not_found::reject_head;
use axum::{
    extract::State,
    http::{Method, Uri},
    Json,
};

/// POST /api/init-demo-data handler - Overwrite the demo records
///
/// `users` and `products` are written one after the other. If the second write
/// fails the first is left in place and the request reports a 500.
#[utoipa::path(
    post,
    path = routes::INIT_DEMO_DATA,
    responses(
        (status = 200, description = "Demo data written", body = ApiResponse),
        (status = 500, description = "Store error", body = ApiResponse)
    ),
    tag = "kv"
)]
pub async fn init_demo_data_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse>, KvError> {
    let demo = DemoData::fixture();

    put_json(state.kv.as_ref(), USERS_KEY, &demo.users).await?;
    put_json(state.kv.as_ref(), PRODUCTS_KEY, &demo.products).await?;

    tracing::info!(
        "Initialized demo data ({} users, {} products)",
        demo.users.len(),
        demo.products.len()
    );
    Ok(Json(
        ApiResponse::ok(&demo)?.with_message("Demo data initialized successfully"),
    ))
}

/// GET /api/data handler - Read back the demo records
#[utoipa::path(
    get,
    path = routes::DATA,
    responses(
        (status = 200, description = "Stored records; absent keys are null", body = ApiResponse),
        (status = 500, description = "Store error", body = ApiResponse)
    ),
    tag = "kv"
)]
pub async fn get_data_handler(
    method: Method,
    uri: Uri,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse>, KvError> {
    reject_head(&method, &uri)?;

    let users = get_json(state.kv.as_ref(), USERS_KEY).await?;
    let products = get_json(state.kv.as_ref(), PRODUCTS_KEY).await?;

    tracing::debug!(
        "Read demo data (users present: {}, products present: {})",
        users.is_some(),
        products.is_some()
    );
    Ok(Json(ApiResponse::ok(StoredData { users, products })?))
}

/// POST /api/clear-data handler - Delete the demo records
#[utoipa::path(
    post,
    path = routes::CLEAR_DATA,
    responses(
        (status = 200, description = "Demo keys deleted", body = ApiResponse),
        (status = 500, description = "Store error", body = ApiResponse)
    ),
    tag = "kv"
)]
pub async fn clear_data_handler(State(state): State<AppState>) -> Result<Json<ApiResponse>, KvError> {
    state.kv.delete(USERS_KEY).await?;
    state.kv.delete(PRODUCTS_KEY).await?;

    tracing::info!("Cleared demo data");
    Ok(Json(ApiResponse::ok_message("All data cleared successfully")))
}
