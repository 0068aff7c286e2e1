use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::kv::KeyInfo;

/// Current time as RFC 3339 UTC with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Envelope returned by every KV handler endpoint
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(Self {
            success: true,
            data: Some(serde_json::to_value(data)?),
            error: None,
            message: None,
        })
    }

    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }
}

/// Body of `GET /api/data` on the echo handler
#[derive(Debug, Serialize, Deserialize)]
pub struct EchoData {
    pub message: String,
    pub timestamp: String,
    pub environment: String,
}

/// Body of a successful `POST /api/data` on the echo handler
#[derive(Debug, Serialize, Deserialize)]
pub struct EchoReceived {
    pub success: bool,
    pub received: JsonValue,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServiceStatus {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: u32,
}

/// Fixed records written by `POST /api/init-demo-data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DemoData {
    pub users: Vec<User>,
    pub products: Vec<Product>,
}

impl DemoData {
    pub fn fixture() -> Self {
        Self {
            users: vec![
                User {
                    id: "1".to_string(),
                    name: "John Doe".to_string(),
                    email: "john@example.com".to_string(),
                },
                User {
                    id: "2".to_string(),
                    name: "Jane Smith".to_string(),
                    email: "jane@example.com".to_string(),
                },
            ],
            products: vec![
                Product {
                    id: "1".to_string(),
                    name: "Laptop Pro".to_string(),
                    price: 1299.99,
                    stock: 50,
                },
                Product {
                    id: "2".to_string(),
                    name: "Smartphone X".to_string(),
                    price: 799.99,
                    stock: 100,
                },
            ],
        }
    }
}

/// Whatever the store currently holds for the demo keys; `null` when absent
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StoredData {
    pub users: Option<JsonValue>,
    pub products: Option<JsonValue>,
}

/// Query parameters for `GET /api/list-keys`
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ListKeysQuery {
    pub prefix: Option<String>,
    pub limit: Option<usize>,
}

/// Typed view of a successful `GET /api/list-keys` body
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct KeyList {
    pub success: bool,
    pub data: Vec<KeyInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_envelope_omits_data() {
        let body = serde_json::to_value(ApiResponse::failure("Not Found", "nope")).unwrap();
        assert_eq!(
            body,
            json!({"success": false, "error": "Not Found", "message": "nope"})
        );
    }

    #[test]
    fn test_success_envelope() {
        let body = serde_json::to_value(
            ApiResponse::ok(json!({"a": 1})).unwrap().with_message("done"),
        )
        .unwrap();
        assert_eq!(
            body,
            json!({"success": true, "data": {"a": 1}, "message": "done"})
        );
    }

    #[test]
    fn test_stored_data_absent_is_null() {
        let body = serde_json::to_value(StoredData {
            users: None,
            products: None,
        })
        .unwrap();
        assert_eq!(body, json!({"users": null, "products": null}));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'));
        // yyyy-mm-ddThh:mm:ss.mmmZ
        assert_eq!(ts.len(), 24);
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
