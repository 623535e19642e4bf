use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::orchestrator::{self, TranslationRequest, TranslationResponse};
use crate::retriever::{self, AudioArtifact};
use crate::state::AppState;

pub const WELCOME_MESSAGE: &str =
    "Hello, welcome to the translation API. Navigate to /translate-eng-to-span to get started!";

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        // Health check
        .route("/health", get(health_check))
        .route("/translate-eng-to-span", post(translate))
        .route("/translate-eng-to-span/:task_id", get(download_audio))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let Json(request) = payload?;
    orchestrator::handle(&state, request).await.map(Json)
}

async fn download_audio(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<AudioArtifact, ApiError> {
    Ok(retriever::fetch(&state, &task_id).await?)
}
