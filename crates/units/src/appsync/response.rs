use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error details of a failed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Envelope returned for every resolved field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    pub fn success(data: impl Serialize, message: impl Into<String>) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
                message: Some(message.into()),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to format response");
                Self::error(codes::INTERNAL_ERROR, "Failed to format response", None)
            }
        }
    }

    pub fn error(code: &str, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorInfo {
                code: code.to_string(),
                message: message.into(),
                details,
            }),
            message: None,
        }
    }

    /// The error code, if this is an error response.
    #[cfg(test)]
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}

/// Error codes emitted by the handlers on top of the repository codes.
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CREATE_FAILED: &str = "CREATE_FAILED";
    pub const READ_FAILED: &str = "READ_FAILED";
    pub const UPDATE_FAILED: &str = "UPDATE_FAILED";
    pub const DELETE_FAILED: &str = "DELETE_FAILED";
    pub const LIST_FAILED: &str = "LIST_FAILED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const UNKNOWN_OPERATION: &str = "UNKNOWN_OPERATION";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let response = Response::success(json!({ "id": "abc" }), "Unit created successfully");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "data": { "id": "abc" },
                "message": "Unit created successfully"
            })
        );
    }

    #[test]
    fn test_error_shape_omits_empty_fields() {
        let response = Response::error(codes::NOT_FOUND, "Unit not found", None);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "error": { "code": "NOT_FOUND", "message": "Unit not found" }
            })
        );
        assert_eq!(response.error_code(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_error_with_details() {
        let response = Response::error(
            codes::PARSE_ERROR,
            "Failed to parse event",
            Some("expected value at line 1 column 1".to_string()),
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"]["details"], json!("expected value at line 1 column 1"));
    }
}
