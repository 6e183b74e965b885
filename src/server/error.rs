use crate::error::AqiError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, error};

/// Error returned by handlers: not-found lookups become 404, anything else 500.
#[derive(Debug)]
pub struct ApiError(pub AqiError);

impl From<AqiError> for ApiError {
    fn from(err: AqiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_not_found() {
            debug!(error = %self.0, "Lookup matched no rows");
            StatusCode::NOT_FOUND
        } else {
            error!(error = %self.0, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
