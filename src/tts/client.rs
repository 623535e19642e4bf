use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, error, info};

use super::interface::{AudioStream, TTSInterface, TTSRequest, TtsError};

const OUTPUT_FORMAT: &str = "mp3_44100_128";

/// TTS client that talks to the ElevenLabs text-to-speech API
pub struct ElevenLabsClient {
    client: Client,
    api_key: String,
    base_url: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsClient {
    /// Create a new TTS client
    pub fn new(
        client: Client,
        api_key: String,
        base_url: String,
        voice_id: String,
        model_id: String,
    ) -> Self {
        info!("Initialized ElevenLabs client: voice_id={}, model_id={}", voice_id, model_id);
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            voice_id,
            model_id,
        }
    }
}

#[async_trait]
impl TTSInterface for ElevenLabsClient {
    async fn generate_audio(&self, text: &str) -> Result<AudioStream, TtsError> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let request = TTSRequest {
            text: text.to_string(),
            model_id: self.model_id.clone(),
        };

        debug!("Sending TTS request: chars={}, voice_id={}", text.len(), self.voice_id);

        let response = self
            .client
            .post(&url)
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", &self.api_key)
            .header(ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("TTS synthesis failed: status={}, body={}", status, message);
            return Err(TtsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes_stream().map_err(TtsError::from).boxed())
    }
}
