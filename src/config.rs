use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub tts: TTSConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Configuration for the DeepL translation API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub api_key: String,
    /// Defaults to the free or pro endpoint depending on the key
    pub base_url: Option<String>,
}

/// Configuration for the ElevenLabs text-to-speech API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TTSConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_tts_base_url")]
    pub base_url: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    /// Blob account endpoint, e.g. `https://myaccount.blob.core.windows.net`
    pub container_url: Option<String>,
    #[serde(default = "default_container_name")]
    pub container_name: String,
    /// Local artifacts older than this are reaped. Unset keeps them forever.
    pub audio_ttl_secs: Option<u64>,
    #[serde(default = "default_reap_interval_secs")]
    pub reap_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Upper bound for every outbound call to an upstream service
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_tts_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

// "Rachel"
fn default_voice_id() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

fn default_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("generated_audio")
}

fn default_container_name() -> String {
    "audio-files".to_string()
}

fn default_reap_interval_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TTSConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_tts_base_url(),
            voice_id: default_voice_id(),
            model_id: default_model_id(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            container_url: None,
            container_name: default_container_name(),
            audio_ttl_secs: None,
            reap_interval_secs: default_reap_interval_secs(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Build the configuration for this process.
    ///
    /// Reads `CONFIG_PATH` when set, otherwise starts from defaults. The
    /// environment always has the last word.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::load(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML or JSON file, substituting `${VAR}`
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let content = substitute_env_vars(&content, |name| std::env::var(name).ok());

        let path_lower = path.to_lowercase();
        let config = if path_lower.ends_with(".json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("DEEPL_API_KEY") {
            self.translation.api_key = key;
        }
        if let Some(key) = lookup("ELEVEN_API_KEY") {
            self.tts.api_key = key;
        }
        if let Some(url) = lookup("AZURE_CONTAINER") {
            self.storage.container_url = Some(url);
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {}", port))?;
        }
        if let Some(dir) = lookup("AUDIO_DIR") {
            self.storage.audio_dir = PathBuf::from(dir);
        }
        if let Some(ttl) = lookup("AUDIO_TTL_SECS") {
            self.storage.audio_ttl_secs = Some(
                ttl.parse()
                    .with_context(|| format!("AUDIO_TTL_SECS is not a number: {}", ttl))?,
            );
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.translation.api_key.is_empty() {
            anyhow::bail!("DEEPL_API_KEY is not set");
        }
        if self.tts.api_key.is_empty() {
            anyhow::bail!("ELEVEN_API_KEY is not set");
        }
        if self.storage.container_url.as_deref().map_or(true, str::is_empty) {
            anyhow::bail!("AZURE_CONTAINER is not set");
        }
        if self.storage.reap_interval_secs == 0 {
            anyhow::bail!("storage.reap_interval_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn audio_dir(&self) -> &Path {
        &self.storage.audio_dir
    }
}

/// Replace `${VAR_NAME}` with the looked-up value, leaving unknown names as-is
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("static pattern is valid");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
