//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use fuseq_core::FuseError;

/// Wrapper turning engine errors into HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub FuseError);

impl From<FuseError> for ApiError {
    fn from(err: FuseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            FuseError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            FuseError::AllSourcesUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "type": self.0.error_code(),
                "message": self.0.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
