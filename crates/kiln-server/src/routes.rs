use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use kiln_training::{JobStatus, TrainingRequest};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct TrainResponse {
    success: bool,
    model_id: String,
    message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/train", post(train))
        .route("/status/:model_id", get(status))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Kiln Training Service",
        "status": "running",
    }))
}

/// Accepts a training request and returns immediately; the job runs in the
/// background and is observed by polling its status.
async fn train(
    State(state): State<AppState>,
    Json(request): Json<TrainingRequest>,
) -> Result<Json<TrainResponse>, ApiError> {
    request.validate().map_err(|e| ApiError::Invalid(e.to_string()))?;

    let model_id = request.model_id.clone();
    state.store.create(&model_id, request.hyperparams.epochs).await;
    state.queue.submit(request).map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(model_id = %model_id, "Accepted training job");
    Ok(Json(TrainResponse {
        success: true,
        model_id,
        message: "Training started".to_string(),
    }))
}

async fn status(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<Json<JobStatus>, ApiError> {
    state
        .store
        .get(&model_id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Training job not found"))
}
