use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::foundation::error::GifBeatError;

/// Error body returned by every API route: `{"success": false, "error": "..."}`.
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

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<GifBeatError> for ApiError {
    fn from(err: GifBeatError) -> Self {
        match err {
            // Validation messages are already phrased for the user.
            GifBeatError::Validation(msg) => Self::bad_request(msg),
            GifBeatError::Decode(_) => Self::bad_request(err.to_string()),
            GifBeatError::Encode(_) | GifBeatError::Io(_) | GifBeatError::Other(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.message, "request rejected");
        }
        let body = json!({"success": false, "error": self.message});
        (self.status, Json(body)).into_response()
    }
}
