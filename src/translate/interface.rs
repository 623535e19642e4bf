//! Translate interface - implemented against the DeepL REST API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: Option<String>,
    pub target_lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    pub detected_source_language: Option<String>,
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authorization failure, check the DeepL API key")]
    Unauthorized,

    #[error("DeepL quota for this billing period has been exceeded")]
    QuotaExceeded,

    #[error("DeepL returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("DeepL returned no translations")]
    EmptyResponse,
}

#[async_trait]
pub trait TranslateInterface: Send + Sync {
    async fn translate(&self, request: &TranslateRequest) -> Result<TranslateResponse, TranslateError>;
}
