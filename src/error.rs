use std::io;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;
use crate::translate::TranslateError;
use crate::tts::TtsError;

/// The step of the generate path that failed
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("translation failed: {0}")]
    TranslationFailed(#[source] TranslateError),

    #[error("speech synthesis failed: {0}")]
    SynthesisFailed(#[source] TtsError),

    #[error("writing audio to disk failed: {0}")]
    LocalWriteFailed(#[source] io::Error),

    #[error("uploading audio to blob storage failed: {0}")]
    RemoteUploadFailed(#[source] StorageError),
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TranslationFailed(_) => "translation_failed",
            Self::SynthesisFailed(_) => "synthesis_failed",
            Self::LocalWriteFailed(_) => "local_write_failed",
            Self::RemoteUploadFailed(_) => "remote_upload_failed",
        }
    }

    /// The upstream message, without the step prefix
    pub fn detail(&self) -> String {
        match self {
            Self::TranslationFailed(e) => e.to_string(),
            Self::SynthesisFailed(e) => e.to_string(),
            Self::LocalWriteFailed(e) => e.to_string(),
            Self::RemoteUploadFailed(e) => e.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RetrieveError {
    #[error("Audio file not found")]
    NotFound,

    #[error("reading audio failed: {0}")]
    Io(#[from] io::Error),
}

/// Errors surfaced over HTTP as `{"detail": ...}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    /// The body was not a JSON `TranslationRequest`
    #[error(transparent)]
    Body(#[from] JsonRejection),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Retrieve(#[from] RetrieveError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidInput(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "detail": message }),
            ),
            ApiError::Body(rejection) => (
                rejection.status(),
                json!({ "detail": rejection.body_text() }),
            ),
            ApiError::Generation(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": e.detail(), "kind": e.kind() }),
            ),
            ApiError::Retrieve(RetrieveError::NotFound) => (
                StatusCode::NOT_FOUND,
                json!({ "detail": "Audio file not found" }),
            ),
            ApiError::Retrieve(e @ RetrieveError::Io(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": e.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
