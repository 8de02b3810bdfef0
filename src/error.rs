use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use serde::Serialize;
use thiserror::Error;

/// Failures surfaced to HTTP callers. Upstream trouble on the chat route never reaches this
/// type; it is absorbed by the fallback path.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Remote API unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Remote API error: {0}")]
    Upstream(String),

    #[error("Could not parse remote API output: {0}")]
    ParseFailure(String),
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::Upstream(_) | RelayError::ParseFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            RelayError::InvalidInput(msg) => ErrorResponse {
                error: msg.clone(),
                details: None,
            },
            RelayError::UpstreamUnavailable(msg) => ErrorResponse {
                error: "Remote API unavailable".to_string(),
                details: Some(msg.clone()),
            },
            RelayError::Upstream(msg) | RelayError::ParseFailure(msg) => ErrorResponse {
                error: "Remote API request failed".to_string(),
                details: Some(msg.clone()),
            },
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_status_codes() {
        assert_eq!(RelayError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::UpstreamUnavailable("no key".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(RelayError::Upstream("boom".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(RelayError::ParseFailure("empty".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_input_body_has_no_details() {
        let body = serde_json::to_value(RelayError::InvalidInput("bad".into()).body()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "bad" }));
    }

    #[test]
    fn upstream_body_carries_details() {
        let body = serde_json::to_value(RelayError::Upstream("timeout".into()).body()).unwrap();
        assert_eq!(body["details"], "timeout");
        assert!(body["error"].is_string());
    }
}
