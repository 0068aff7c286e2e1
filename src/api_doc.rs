use utoipa::OpenApi;

use crate::handlers;
use crate::kv::KeyInfo;
use crate::models::{ApiResponse, DemoData, KeyList, Product, ServiceStatus, StoredData, User};

/// OpenAPI documentation of the KV handler
#[derive(OpenApi)]
#[openapi(
    info(
        title = "edge-kv-worker API",
        version = "0.1.0",
        description = "Demo CRUD endpoints over an edge key-value namespace"
    ),
    paths(
        handlers::status::status_handler,
        handlers::demo_data::init_demo_data_handler,
        handlers::demo_data::get_data_handler,
        handlers::demo_data::clear_data_handler,
        handlers::list_keys::list_keys_handler
    ),
    components(
        schemas(
            ApiResponse,
            ServiceStatus,
            DemoData,
            User,
            Product,
            StoredData,
            KeyInfo,
            KeyList
        )
    ),
    tags(
        (name = "status", description = "Service status"),
        (name = "kv", description = "Key-value demo operations")
    )
)]
pub struct ApiDoc;
