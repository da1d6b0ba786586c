use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, GENERIC_ERROR_MESSAGE};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `{success, data, error: {message}}` wrapper used by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiErrorBody {
                message: Some(message.into()),
            }),
        }
    }

    /// Server-provided message, if it sent a non-blank one.
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|body| body.message.as_deref())
            .filter(|message| !message.trim().is_empty())
    }

    /// Message to show for a failed envelope, falling back to `fallback`.
    pub fn failure_message_or(&self, fallback: &str) -> String {
        self.error_message().unwrap_or(fallback).to_string()
    }

    /// Converts into `data` on success, or [`ApiError::Rejected`] carrying the
    /// server message verbatim.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::Rejected(
                self.failure_message_or(GENERIC_ERROR_MESSAGE),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn decodes_failure_with_message() {
        let envelope: ApiEnvelope<Value> =
            serde_json::from_value(json!({"success": false, "error": {"message": "Duplicate title"}}))
                .unwrap();
        assert_eq!(
            envelope.into_result(),
            Err(ApiError::Rejected("Duplicate title".into()))
        );
    }

    #[test]
    fn missing_message_falls_back_to_generic() {
        let envelope: ApiEnvelope<Value> =
            serde_json::from_value(json!({"success": false, "error": {}})).unwrap();
        assert_eq!(envelope.failure_message_or("fallback"), "fallback");
        assert_eq!(
            envelope.into_result(),
            Err(ApiError::Rejected(GENERIC_ERROR_MESSAGE.into()))
        );
    }

    #[test]
    fn missing_success_flag_counts_as_failure() {
        let envelope: ApiEnvelope<Value> =
            serde_json::from_value(json!({"data": {"id": "1"}})).unwrap();
        assert!(!envelope.success);
    }
}
