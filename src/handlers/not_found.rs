use crate::error::KvError;
use axum::http::{Method, Uri};

/// Fallback for any path/method combination the KV handler does not serve
pub async fn not_found_handler(method: Method, uri: Uri) -> KvError {
    KvError::RouteNotFound {
        path: uri.path().to_string(),
        method: method.to_string(),
    }
}

/// axum serves HEAD from GET routes; the KV handler only answers the listed methods
pub fn reject_head(method: &Method, uri: &Uri) -> Result<(), KvError> {
    if *method == Method::HEAD {
        return Err(KvError::RouteNotFound {
            path: uri.path().to_string(),
            method: method.to_string(),
        });
    }
    Ok(())
}
