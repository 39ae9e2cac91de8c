//! Shared handler state and the HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use salescast_core::Error;
use salescast_pipeline::ProjectConfig;
use serde_json::json;

pub struct AppState {
    pub project: ProjectConfig,
}

impl AppState {
    pub fn new(project: ProjectConfig) -> Self {
        Self { project }
    }
}

/// Wraps core errors so handlers can use `?`. NotFound becomes a 404 with a
/// descriptive body rather than an empty success.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidParams(_) | Error::Config(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError(Error::not_found("deployed model")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_params_map_to_400() {
        let response = ApiError(Error::invalid_params("missing key `target`")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn everything_else_is_500() {
        let response = ApiError(Error::data("sqlite query failed")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
