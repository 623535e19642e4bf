use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::path::Path;
use object_store::ObjectStore;
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid blob container url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    ObjectStore(#[from] object_store::Error),
}

/// Remote copy of generated artifacts
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `data` under `name`
    async fn upload(&self, name: &str, data: Bytes) -> Result<(), StorageError>;
}

/// [`BlobStore`] backed by any `object_store` implementation
pub struct ObjectBlobStore {
    store: Arc<dyn ObjectStore>,
}

impl ObjectBlobStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Connect to an Azure Blob Storage container.
    ///
    /// `account_url` is the account endpoint, e.g.
    /// `https://myaccount.blob.core.windows.net`. Credentials come from the
    /// ambient chain: `AZURE_STORAGE_*` / `AZURE_CLIENT_*` environment
    /// variables when present, otherwise the managed identity endpoint.
    pub fn azure(account_url: &str, container: &str) -> Result<Self, StorageError> {
        let account = account_name(account_url)?;
        let mut builder = MicrosoftAzureBuilder::from_env()
            .with_account(account.clone())
            .with_container_name(container);

        if !is_public_blob_host(account_url) {
            builder = builder
                .with_endpoint(account_url.trim_end_matches('/').to_string())
                .with_allow_http(true);
        }

        let store = builder.build()?;
        info!("Initialized Azure blob store: account={}, container={}", account, container);
        Ok(Self::new(Arc::new(store)))
    }
}

#[async_trait]
impl BlobStore for ObjectBlobStore {
    async fn upload(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        let size = data.len();
        self.store.put(&Path::from(name), data.into()).await?;
        debug!("Uploaded blob {} ({} bytes)", name, size);
        Ok(())
    }
}

fn invalid(url: &str, reason: impl Into<String>) -> StorageError {
    StorageError::InvalidUrl {
        url: url.to_string(),
        reason: reason.into(),
    }
}

/// Storage account name, taken from the first label of the endpoint host
fn account_name(account_url: &str) -> Result<String, StorageError> {
    let url = Url::parse(account_url).map_err(|e| invalid(account_url, e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid(account_url, "missing host"))?;

    // Emulator style endpoints carry the account as the first path segment
    if !host.ends_with(".blob.core.windows.net") {
        if let Some(account) = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|s| !s.is_empty())
        {
            return Ok(account.to_string());
        }
    }

    host.split('.')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| invalid(account_url, "cannot determine account name"))
}

fn is_public_blob_host(account_url: &str) -> bool {
    Url::parse(account_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.ends_with(".blob.core.windows.net")))
        .unwrap_or(false)
}
