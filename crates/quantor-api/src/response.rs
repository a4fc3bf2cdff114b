use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use quantor_model::PipelineError;

/// Uniform success envelope for every JSON response this service returns.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

/// Maps a pipeline failure to the HTTP status and body shape `spec.md` §6
/// requires: `{"analysis_errors": [...]}` for validation failures,
/// `{"execution_errors": [...]}` for execution failures, 500 otherwise.
pub struct AppError(pub PipelineError);

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body): (StatusCode, Value) = match self.0 {
            PipelineError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({ "analysis_errors": e.0.messages() }),
            ),
            PipelineError::Execution(e) => (
                StatusCode::BAD_REQUEST,
                json!({ "execution_errors": e.0.messages() }),
            ),
            PipelineError::Internal(e) => {
                tracing::error!(error = %e, "internal pipeline error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
