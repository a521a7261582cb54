/// Response envelope
///
/// Every response body, success or failure, has the same shape:
///
/// ```json
/// { "success": true, "message": "...", "data": { ... } }
/// { "success": false, "error": "..." }
/// ```
///
/// Absent fields are omitted rather than serialized as `null`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform JSON wrapper for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful response carrying `data`
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    /// Failed response carrying an error message
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Attaches data to a failed response
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let envelope = Envelope::success("Login successful", json!({"token": "t"}));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({"success": true, "message": "Login successful", "data": {"token": "t"}})
        );
    }

    #[test]
    fn test_failure_shape() {
        let envelope: Envelope = Envelope::failure("Invalid username or password");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({"success": false, "error": "Invalid username or password"})
        );
    }

    #[test]
    fn test_failure_with_data() {
        let envelope = Envelope::failure("Validation failed").with_data(json!([{"field": "email"}]));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["data"][0]["field"], "email");
        assert!(value.get("message").is_none());
    }
}
