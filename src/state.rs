use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::config::Config;
use crate::storage::{BlobStore, LocalAudioStore, ObjectBlobStore};
use crate::translate::{DeepLClient, TranslateInterface};
use crate::tts::{ElevenLabsClient, TTSInterface};

/// Shared, read-only handles for every request
#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<dyn TranslateInterface>,
    pub tts: Arc<dyn TTSInterface>,
    pub local_store: Arc<LocalAudioStore>,
    pub blob_store: Arc<dyn BlobStore>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.request_timeout_secs))
            .build()?;

        let translator = Arc::new(DeepLClient::new(
            http.clone(),
            config.translation.api_key.clone(),
            config.translation.base_url.clone(),
        ));

        let tts = Arc::new(ElevenLabsClient::new(
            http,
            config.tts.api_key.clone(),
            config.tts.base_url.clone(),
            config.tts.voice_id.clone(),
            config.tts.model_id.clone(),
        ));

        let local_store = LocalAudioStore::open(config.audio_dir())
            .await
            .with_context(|| format!("Failed to create audio directory {}", config.audio_dir().display()))?;

        let container_url = config
            .storage
            .container_url
            .as_deref()
            .context("AZURE_CONTAINER is not set")?;
        let blob_store = ObjectBlobStore::azure(container_url, &config.storage.container_name)?;

        Ok(Self {
            translator,
            tts,
            local_store: Arc::new(local_store),
            blob_store: Arc::new(blob_store),
        })
    }
}
