use crate::kv::KvStore;
use std::sync::Arc;

/// Shared state of the KV handler
#[derive(Clone)]
pub struct AppState {
    pub kv: Arc<dyn KvStore>,
}
