//! Error-to-status mapping for the flow endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use flowdeck_core::CoreError;

/// Wrapper giving core errors an HTTP shape.
///
/// - Invalid argument / invalid state: 400 Bad Request
/// - Not found: 404 Not Found
/// - Storage or summarizer failure: 502 Bad Gateway
/// - Everything else: 500 Internal Server Error
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            CoreError::InvalidArgument { .. } | CoreError::InvalidState(_) => {
                StatusCode::BAD_REQUEST
            }
            CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            CoreError::Storage(_) | CoreError::Summarizer(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
