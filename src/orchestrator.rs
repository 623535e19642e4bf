//! Generate path: translate, synthesize, store locally, copy to blob storage.

use std::io;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, GenerationError};
use crate::state::AppState;
use crate::storage::WriteFailure;
use crate::task::TaskId;
use crate::translate::TranslateRequest;

/// Spanish, as a DeepL target language code
pub const TARGET_LANG: &str = "ES";

pub const SUCCESS_MESSAGE: &str = "Audio generated successfully and sent to blob";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub task_id: String,
    pub message: String,
}

/// Validate the request and run the generate path
pub async fn handle(state: &AppState, request: TranslationRequest) -> Result<TranslationResponse, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::InvalidInput("text must not be empty".to_string()));
    }

    let task_id = generate(state, &request.text).await?;
    Ok(TranslationResponse {
        task_id: task_id.to_string(),
        message: SUCCESS_MESSAGE.to_string(),
    })
}

/// Produce and store the Spanish audio for `text`.
///
/// Nothing touches the disk before translation has succeeded and synthesis
/// has started streaming. If the read-back or the blob upload fails the
/// local copy is removed again, so the id reads as never generated.
pub async fn generate(state: &AppState, text: &str) -> Result<TaskId, GenerationError> {
    let task_id = TaskId::new();
    debug!("Starting generation for task {}", task_id);

    let translation = state
        .translator
        .translate(&TranslateRequest {
            text: text.to_string(),
            source_lang: None,
            target_lang: TARGET_LANG.to_string(),
        })
        .await
        .map_err(|e| {
            error!("Task {}: translation failed: {}", task_id, e);
            GenerationError::TranslationFailed(e)
        })?;
    debug!(
        "Task {}: translated from {}",
        task_id,
        translation.detected_source_language.as_deref().unwrap_or("unknown")
    );

    let audio = state
        .tts
        .generate_audio(&translation.translated_text)
        .await
        .map_err(|e| {
            error!("Task {}: speech synthesis failed: {}", task_id, e);
            GenerationError::SynthesisFailed(e)
        })?;

    state
        .local_store
        .write_stream(&task_id, audio)
        .await
        .map_err(|failure| match failure {
            WriteFailure::Source(e) => {
                error!("Task {}: audio stream failed: {}", task_id, e);
                GenerationError::SynthesisFailed(e)
            }
            WriteFailure::Io(e) => {
                error!("Task {}: writing audio failed: {}", task_id, e);
                GenerationError::LocalWriteFailed(e)
            }
        })?;

    publish(state, &task_id).await?;

    info!("Task {}: audio generated and uploaded", task_id);
    Ok(task_id)
}

/// Copy the finished artifact to blob storage, removing the local copy if
/// either the read-back or the upload fails.
async fn publish(state: &AppState, task_id: &TaskId) -> Result<(), GenerationError> {
    let result = upload_stored(state, task_id).await;
    if result.is_err() {
        if let Err(e) = state.local_store.remove(task_id).await {
            warn!("Task {}: could not remove local copy after failed publish: {}", task_id, e);
        }
    }
    result
}

async fn upload_stored(state: &AppState, task_id: &TaskId) -> Result<(), GenerationError> {
    let stored = match state.local_store.read(task_id).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return Err(GenerationError::LocalWriteFailed(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} vanished before upload", task_id.file_name()),
            )))
        }
        Err(e) => {
            error!("Task {}: reading audio back failed: {}", task_id, e);
            return Err(GenerationError::LocalWriteFailed(e));
        }
    };

    state
        .blob_store
        .upload(&task_id.file_name(), Bytes::from(stored))
        .await
        .map_err(|e| {
            error!("Task {}: blob upload failed: {}", task_id, e);
            GenerationError::RemoteUploadFailed(e)
        })
}
