//! Request and error bodies of the deal endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::DealStatus;

/// Body of `PUT /api/deals/{id}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateRequest {
    /// Requested status.
    pub status: DealStatus,
}

/// Error body returned by the API on non-success responses.
///
/// ```json
/// { "message": "Deal not found" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_request_uses_wire_names() {
        let body = StatusUpdateRequest {
            status: DealStatus::InProgress,
        };
        let Ok(json) = serde_json::to_value(&body) else {
            panic!("serialization failed");
        };
        assert_eq!(json, serde_json::json!({"status": "in-progress"}));
    }

    #[test]
    fn error_body_tolerates_missing_message() {
        let Ok(body) = serde_json::from_str::<ApiErrorBody>("{}") else {
            panic!("error body should parse");
        };
        assert!(body.message.is_empty());
    }
}
