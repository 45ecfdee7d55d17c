//! HTTP mapping for store errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Wrapper so handlers can return `Result<_, ApiError>` and `?` store calls.
///
/// `NotFound` -> 404, `Conflict` -> 400, `Internal` -> 500. Every failure
/// body is `{"error": message}`.
pub struct ApiError(pub dls_db::Error);

impl From<dls_db::Error> for ApiError {
    fn from(err: dls_db::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            dls_db::Error::NotFound(_) => StatusCode::NOT_FOUND,
            dls_db::Error::Conflict(_) => StatusCode::BAD_REQUEST,
            dls_db::Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "store failure");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
