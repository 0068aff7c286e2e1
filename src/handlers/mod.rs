pub mod demo_data;
pub mod echo;
pub mod list_keys;
pub mod not_found;
pub mod status;

pub use demo_data::{clear_data_handler, get_data_handler, init_demo_data_handler};
pub use list_keys::list_keys_handler;
pub use not_found::not_found_handler;
pub use status::status_handler;

use crate::routes;
use crate::state::AppState;
use axum::{
    routing::{any, get, post},
    Router,
};

/// Routes of the KV handler
///
/// Every path/method combination not listed here falls through to
/// [`not_found_handler`], including a known path called with the wrong method.
pub fn kv_router() -> Router<AppState> {
    Router::new()
        .route(routes::STATUS, any(status_handler))
        .route(
            routes::INIT_DEMO_DATA,
            post(init_demo_data_handler).fallback(not_found_handler),
        )
        .route(routes::DATA, get(get_data_handler).fallback(not_found_handler))
        .route(
            routes::CLEAR_DATA,
            post(clear_data_handler).fallback(not_found_handler),
        )
        .route(
            routes::LIST_KEYS,
            get(list_keys_handler).fallback(not_found_handler),
        )
        .fallback(not_found_handler)
}
