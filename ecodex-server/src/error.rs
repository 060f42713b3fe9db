//! API error types
//!
//! Maps the pipeline taxonomy onto HTTP responses with stable error codes.
//! Malformed oracle replies carry the raw text in the body so prompt drift
//! can be diagnosed from the client side too.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::PipelineError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or malformed user identity (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Discovery pipeline failure; status depends on the kind
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// ecodex-common error
    #[error("Common error: {0}")]
    Common(#[from] ecodex_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::Pipeline(err) => pipeline_response(err),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
                None,
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
                None,
            ),
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });
        if let Some(detail) = detail {
            body["error"]["detail"] = detail;
        }

        (status, Json(body)).into_response()
    }
}

fn pipeline_response(
    err: PipelineError,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    match err {
        PipelineError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg, None),
        PipelineError::ImageDecode(msg) => (StatusCode::BAD_REQUEST, "IMAGE_DECODE", msg, None),
        PipelineError::OracleUnavailable(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "ORACLE_UNAVAILABLE",
            msg,
            Some(json!({"retryable": true})),
        ),
        PipelineError::MalformedOracleResponse { reason, raw } => (
            StatusCode::BAD_GATEWAY,
            "MALFORMED_ORACLE_RESPONSE",
            reason,
            Some(json!({"oracleResponse": raw})),
        ),
        PipelineError::Persistence(ledger_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "PERSISTENCE",
            ledger_err.to_string(),
            None,
        ),
        PipelineError::Internal(msg) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, None)
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn oracle_unavailability_is_retryable_503() {
        let response =
            ApiError::Pipeline(PipelineError::OracleUnavailable("timeout".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn malformed_oracle_reply_is_502() {
        let response = ApiError::Pipeline(PipelineError::MalformedOracleResponse {
            reason: "no JSON object".into(),
            raw: "I have no idea".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_input_is_400() {
        let response =
            ApiError::Pipeline(PipelineError::InvalidInput("no image".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
