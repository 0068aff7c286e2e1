use crate::error::KvError;
use crate::handlers::not_found::reject_head;
use crate::kv::{ListOptions, MAX_LIST_LIMIT};
use crate::models::{ApiResponse, KeyList, ListKeysQuery};
use crate::routes;
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{Method, Uri},
    Json,
};

/// GET /api/list-keys handler - Enumerate store keys
///
/// Query parameters:
/// - prefix: only keys starting with this value (optional)
/// - limit: maximum number of keys, 1 to 1000 (optional, default: 1000)
#[utoipa::path(
    get,
    path = routes::LIST_KEYS,
    params(
        ("prefix" = Option<String>, Query, description = "Only keys starting with this value"),
        ("limit" = Option<usize>, Query, description = "Maximum number of keys to return (1-1000)")
    ),
    responses(
        (status = 200, description = "Keys in lexicographic order", body = KeyList),
        (status = 400, description = "Invalid query parameter", body = ApiResponse),
        (status = 500, description = "Store error", body = ApiResponse)
    ),
    tag = "kv"
)]
pub async fn list_keys_handler(
    method: Method,
    uri: Uri,
    State(state): State<AppState>,
    query: Result<Query<ListKeysQuery>, QueryRejection>,
) -> Result<Json<ApiResponse>, KvError> {
    reject_head(&method, &uri)?;
    let Query(query) = query.map_err(|rejection| KvError::InvalidQuery(rejection.body_text()))?;
    let options = list_options(query)?;

    let keys = state.kv.list(&options).await?;

    tracing::info!(
        "Listed {} keys (prefix: {:?}, limit: {})",
        keys.len(),
        options.prefix,
        options.limit
    );
    Ok(Json(ApiResponse::ok(keys)?))
}

fn list_options(query: ListKeysQuery) -> Result<ListOptions, KvError> {
    let limit = match query.limit {
        None => MAX_LIST_LIMIT,
        Some(limit) if (1..=MAX_LIST_LIMIT).contains(&limit) => limit,
        Some(limit) => {
            return Err(KvError::InvalidQuery(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIST_LIMIT, limit
            )))
        }
    };

    Ok(ListOptions {
        prefix: query.prefix.filter(|prefix| !prefix.is_empty()),
        limit,
    })
}
