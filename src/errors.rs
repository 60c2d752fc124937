use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::services::scheduling::SchedulingProviderError;
use crate::services::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("scheduling provider error: {0}")]
    SchedulingProvider(#[from] SchedulingProviderError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::SchedulingProvider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Validation(e) => json!({
                "success": false,
                "error": self.to_string(),
                "missing_fields": e.missing_fields,
                "invalid_fields": e.invalid_fields,
            }),
            AppError::SchedulingProvider(_) => json!({
                "success": false,
                "error": self.to_string(),
            }),
        };
        (status, axum::Json(body)).into_response()
    }
}
