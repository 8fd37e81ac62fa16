//! API error handling for consistent JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::automation::AutomationError;
use crate::bridge::BridgeError;

/// API error type that converts to JSON responses.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": true,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<AutomationError> for ApiError {
    fn from(err: AutomationError) -> Self {
        let status = match &err {
            AutomationError::NotFound(_) => StatusCode::NOT_FOUND,
            AutomationError::Invalid(_) | AutomationError::NotSchedulable(_) => {
                StatusCode::BAD_REQUEST
            }
            AutomationError::Transition(_) | AutomationError::OutsideJoinWindow(_) => {
                StatusCode::CONFLICT
            }
            AutomationError::JoinFailed(_) | AutomationError::Calendar(_) => {
                StatusCode::BAD_GATEWAY
            }
            AutomationError::CalendarUnavailable | AutomationError::Closed => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        Self::bad_request(err.to_string())
    }
}

/// Parse a meeting id from a path segment.
pub fn parse_meeting_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid meeting id '{}'", raw)))
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
