use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use quantor_model::{BacktestRequest, JobRecord};
use quantor_scheduler::CancelError;

use crate::response::{AppError, ApiResponse};
use crate::state::AppState;

pub fn backtest_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/backtest", post(submit_backtest))
        .route("/api/v1/backtest/:job_id", get(get_backtest))
        .route("/api/v1/backtest/:job_id", delete(cancel_backtest))
        .route("/api/v1/backtest-sync", post(run_backtest_sync))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "healthy" })
}

#[derive(Serialize)]
struct SubmitResponse {
    job_id: Uuid,
}

/// `POST /api/v1/backtest` — enqueues the job and returns immediately. The
/// scheduler's consumer loop runs it on its own task once admitted through
/// the orchestrator's semaphore.
async fn submit_backtest(
    State(state): State<AppState>,
    Json(request): Json<BacktestRequest>,
) -> impl IntoResponse {
    let job_id = state.scheduler.submit(request).await;
    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(SubmitResponse { job_id })),
    )
}

async fn get_backtest(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ApiResponse<JobRecord>>, StatusCode> {
    state
        .scheduler
        .jobs()
        .get(job_id)
        .await
        .map(|record| Json(ApiResponse::success(record)))
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Serialize)]
struct CancelResponse {
    job_id: Uuid,
    status: &'static str,
}

async fn cancel_backtest(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.scheduler.cancel(job_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!(CancelResponse {
                job_id,
                status: "CANCELLED",
            })),
        )
            .into_response(),
        Err(CancelError::Unknown) => StatusCode::NOT_FOUND.into_response(),
        Err(CancelError::NotPending) => StatusCode::CONFLICT.into_response(),
    }
}

/// `POST /api/v1/backtest-sync` — blocks until the backtest completes.
/// Intended for profiling and tests, not production traffic; the request
/// timeout middleware still bounds how long a caller can wait.
async fn run_backtest_sync(
    State(state): State<AppState>,
    Json(request): Json<BacktestRequest>,
) -> Result<Json<ApiResponse<quantor_model::BacktestResponse>>, AppError> {
    let response = state.scheduler.run_sync(request).await?;
    Ok(Json(ApiResponse::success(response)))
}
