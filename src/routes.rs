// Route path constants - single source of truth for all API paths

pub const ROOT: &str = "/";
pub const DATA: &str = "/api/data";

pub const STATUS: &str = "/api/status";
pub const INIT_DEMO_DATA: &str = "/api/init-demo-data";
pub const CLEAR_DATA: &str = "/api/clear-data";
pub const LIST_KEYS: &str = "/api/list-keys";

pub const DOCS: &str = "/docs";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Keys written by the demo-data endpoints
pub const USERS_KEY: &str = "users";
pub const PRODUCTS_KEY: &str = "products";
