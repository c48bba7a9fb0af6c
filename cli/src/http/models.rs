//! Request/response bodies and the error type for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use vox_core::api::{ErrorKind, ExecutionResult, HistoryEntry, MemoryEntry, MemoryStats};

/// `command` stays untyped so a missing or non-string value reaches the
/// executor and comes back as `E_PARSE_ERROR` instead of a 422 from axum.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub command: Value,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MemoryResponse {
    pub entries: Vec<MemoryEntry>,
    pub stats: MemoryStats,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_id: String,
    pub uptime_seconds: u64,
    pub requests_handled: u64,
    pub commands_succeeded: u64,
    pub commands_blocked: u64,
    pub commands_failed: u64,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
}

/// Transport status for an executor result.
pub fn status_for(result: &ExecutionResult) -> StatusCode {
    if result.success {
        return StatusCode::OK;
    }
    if result.blocked {
        return StatusCode::FORBIDDEN;
    }
    match result.error_code {
        Some(kind) if kind.is_validation() => StatusCode::BAD_REQUEST,
        Some(ErrorKind::SystemError) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

#[derive(Debug, Error)]
pub enum HttpServerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("memory operation failed: {0}")]
    Memory(String),
}

impl HttpServerError {
    fn code(&self) -> ErrorKind {
        match self {
            HttpServerError::InvalidRequest(_) => ErrorKind::ParseError,
            HttpServerError::Memory(_) => ErrorKind::MemoryOperationFailed,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            HttpServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            HttpServerError::Memory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: self.code().as_str().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(status_for(&ExecutionResult::ok("x", "y")), StatusCode::OK);
        assert_eq!(
            status_for(&ExecutionResult::blocked("x", "y")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&ExecutionResult::failed("x", "y", ErrorKind::EmptyCommand)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ExecutionResult::failed("x", "y", ErrorKind::CommandTimeout)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ExecutionResult::failed("x", "y", ErrorKind::SystemError)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
