//! Serve a previously generated artifact by task id.

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::RetrieveError;
use crate::state::AppState;
use crate::task::TaskId;

pub const AUDIO_MEDIA_TYPE: &str = "audio/mpeg";

/// A stored artifact, streamed from disk when turned into a response
#[derive(Debug)]
pub struct AudioArtifact {
    pub file_name: String,
    pub size: u64,
    file: File,
}

/// Look up the local artifact for `raw_id`.
///
/// Malformed ids never reach the filesystem and read as not-found, the same
/// as ids that were never generated. The blob store is not consulted.
pub async fn fetch(state: &AppState, raw_id: &str) -> Result<AudioArtifact, RetrieveError> {
    let task_id = TaskId::parse(raw_id).ok_or_else(|| {
        debug!("Rejected malformed task id: {:?}", raw_id);
        RetrieveError::NotFound
    })?;

    let (file, size) = state
        .local_store
        .open_artifact(&task_id)
        .await?
        .ok_or(RetrieveError::NotFound)?;

    Ok(AudioArtifact {
        file_name: task_id.file_name(),
        size,
        file,
    })
}

impl IntoResponse for AudioArtifact {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, AUDIO_MEDIA_TYPE.to_string()),
                (header::CONTENT_LENGTH, self.size.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", self.file_name),
                ),
            ],
            Body::from_stream(ReaderStream::new(self.file)),
        )
            .into_response()
    }
}
