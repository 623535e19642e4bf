use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audio as it arrives from the synthesis service, chunk by chunk
pub type AudioStream = BoxStream<'static, Result<Bytes, TtsError>>;

/// TTS request for synthesizing text to speech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TTSRequest {
    pub text: String,
    pub model_id: String,
}

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("speech synthesis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ElevenLabs returned status {status}: {message}")]
    Api { status: u16, message: String },
}

/// TTS interface trait
#[async_trait]
pub trait TTSInterface: Send + Sync {
    /// Synthesize `text` and return the encoded MP3 audio as a stream.
    ///
    /// The returned stream may still fail part-way through; callers must not
    /// treat the audio as complete until the stream has ended without error.
    async fn generate_audio(&self, text: &str) -> Result<AudioStream, TtsError>;
}
