//! In-process fakes for the upstream services, shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::ObjectStore;
use tempfile::TempDir;

use crate::config::Config;
use crate::state::AppState;
use crate::storage::{BlobStore, LocalAudioStore, ObjectBlobStore, StorageError};
use crate::translate::interface::TranslateResponse;
use crate::translate::{TranslateError, TranslateInterface, TranslateRequest};
use crate::tts::{AudioStream, TTSInterface, TtsError};

const AUDIO: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00fake-mp3-frames";

#[derive(Debug, Clone, Copy)]
pub enum TranslatorBehavior {
    Succeed,
    Fail,
}

#[derive(Debug, Clone, Copy)]
pub enum TtsBehavior {
    Succeed,
    /// The request itself is refused
    Reject,
    /// Some audio arrives, then the connection drops
    BreakMidStream,
}

pub struct FakeTranslator {
    behavior: TranslatorBehavior,
    requests: Mutex<Vec<TranslateRequest>>,
}

#[async_trait]
impl TranslateInterface for FakeTranslator {
    async fn translate(&self, request: &TranslateRequest) -> Result<TranslateResponse, TranslateError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.behavior {
            TranslatorBehavior::Succeed => Ok(TranslateResponse {
                translated_text: match request.text.as_str() {
                    "hello" => "hola".to_string(),
                    other => format!("[es] {other}"),
                },
                detected_source_language: Some("EN".to_string()),
            }),
            TranslatorBehavior::Fail => Err(TranslateError::Unauthorized),
        }
    }
}

pub struct FakeTts {
    behavior: TtsBehavior,
    inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl TTSInterface for FakeTts {
    async fn generate_audio(&self, text: &str) -> Result<AudioStream, TtsError> {
        self.inputs.lock().unwrap().push(text.to_string());
        let (head, tail) = AUDIO.split_at(4);
        match self.behavior {
            TtsBehavior::Succeed => Ok(stream::iter(vec![
                Ok::<_, TtsError>(Bytes::from_static(head)),
                Ok(Bytes::from_static(tail)),
            ])
            .boxed()),
            TtsBehavior::Reject => Err(TtsError::Api {
                status: 401,
                message: "invalid_api_key".to_string(),
            }),
            TtsBehavior::BreakMidStream => Ok(stream::iter(vec![
                Ok(Bytes::from_static(head)),
                Err(TtsError::Api {
                    status: 502,
                    message: "upstream closed the stream".to_string(),
                }),
            ])
            .boxed()),
        }
    }
}

pub struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    async fn upload(&self, _name: &str, _data: Bytes) -> Result<(), StorageError> {
        Err(StorageError::ObjectStore(object_store::Error::Generic {
            store: "test",
            source: "container audio-files is unreachable".into(),
        }))
    }
}

pub struct HarnessBuilder {
    translator: TranslatorBehavior,
    tts: TtsBehavior,
    failing_blob_store: bool,
}

impl HarnessBuilder {
    pub fn translator(mut self, behavior: TranslatorBehavior) -> Self {
        self.translator = behavior;
        self
    }

    pub fn tts(mut self, behavior: TtsBehavior) -> Self {
        self.tts = behavior;
        self
    }

    pub fn failing_blob_store(mut self) -> Self {
        self.failing_blob_store = true;
        self
    }

    pub async fn build(self) -> Harness {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.audio_dir = temp_dir.path().join("generated_audio");

        let local_store = LocalAudioStore::open(config.audio_dir()).await.unwrap();
        let translator = Arc::new(FakeTranslator {
            behavior: self.translator,
            requests: Mutex::new(Vec::new()),
        });
        let tts = Arc::new(FakeTts {
            behavior: self.tts,
            inputs: Mutex::new(Vec::new()),
        });
        let remote = Arc::new(InMemory::new());
        let blob_store: Arc<dyn BlobStore> = if self.failing_blob_store {
            Arc::new(FailingBlobStore)
        } else {
            Arc::new(ObjectBlobStore::new(remote.clone()))
        };

        let state = AppState {
            translator: translator.clone(),
            tts: tts.clone(),
            local_store: Arc::new(local_store),
            blob_store,
        };

        Harness {
            state,
            translator,
            tts,
            remote,
            _temp_dir: temp_dir,
        }
    }
}

/// An `AppState` wired to fakes, with a scratch audio directory
pub struct Harness {
    pub state: AppState,
    translator: Arc<FakeTranslator>,
    tts: Arc<FakeTts>,
    remote: Arc<InMemory>,
    _temp_dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            translator: TranslatorBehavior::Succeed,
            tts: TtsBehavior::Succeed,
            failing_blob_store: false,
        }
    }

    /// Bytes every successful synthesis produces
    pub fn audio(&self) -> Vec<u8> {
        AUDIO.to_vec()
    }

    pub fn translate_calls(&self) -> usize {
        self.translator.requests.lock().unwrap().len()
    }

    pub fn target_langs(&self) -> Vec<String> {
        self.translator
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.target_lang.clone())
            .collect()
    }

    pub fn tts_inputs(&self) -> Vec<String> {
        self.tts.inputs.lock().unwrap().clone()
    }

    /// File names currently in the audio directory
    pub fn local_files(&self) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(self.state.local_store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub async fn remote_object(&self, name: &str) -> Option<Vec<u8>> {
        let result = self.remote.get(&Path::from(name)).await.ok()?;
        Some(result.bytes().await.unwrap().to_vec())
    }

    pub async fn remote_count(&self) -> usize {
        self.remote.list(None).collect::<Vec<_>>().await.len()
    }
}
