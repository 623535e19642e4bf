use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::task::TaskId;
use crate::tts::TtsError;

/// Suffix for audio that is still being received from the synthesis service
pub const PARTIAL_SUFFIX: &str = ".part";

/// Why writing an artifact to disk did not complete
#[derive(Debug)]
pub enum WriteFailure {
    /// The audio stream itself failed
    Source(TtsError),
    /// The filesystem rejected the write
    Io(io::Error),
}

/// Local directory holding `{task_id}.mp3` artifacts
#[derive(Debug, Clone)]
pub struct LocalAudioStore {
    dir: PathBuf,
}

impl LocalAudioStore {
    /// Open the store, creating the directory if it does not exist yet
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        info!("Audio files will be stored in: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, task_id: &TaskId) -> PathBuf {
        self.dir.join(task_id.file_name())
    }

    fn partial_path_for(&self, task_id: &TaskId) -> PathBuf {
        self.dir.join(format!("{}{}", task_id.file_name(), PARTIAL_SUFFIX))
    }

    /// Drain `audio` into `{task_id}.mp3`.
    ///
    /// Chunks land in a `.part` file that is renamed into place only once the
    /// stream has ended cleanly, so `{task_id}.mp3` never exists for a failed
    /// synthesis. On failure the partial file is removed.
    pub async fn write_stream<S>(&self, task_id: &TaskId, audio: S) -> Result<PathBuf, WriteFailure>
    where
        S: Stream<Item = Result<Bytes, TtsError>> + Send,
    {
        let partial = self.partial_path_for(task_id);
        let result = self.drain_into(&partial, audio).await;

        match result {
            Ok(size) => {
                let path = self.path_for(task_id);
                if let Err(e) = fs::rename(&partial, &path).await {
                    discard(&partial).await;
                    return Err(WriteFailure::Io(e));
                }
                debug!("Wrote {} bytes to {}", size, path.display());
                Ok(path)
            }
            Err(failure) => {
                discard(&partial).await;
                Err(failure)
            }
        }
    }

    async fn drain_into<S>(&self, partial: &Path, audio: S) -> Result<u64, WriteFailure>
    where
        S: Stream<Item = Result<Bytes, TtsError>> + Send,
    {
        let mut file = fs::File::create(partial).await.map_err(WriteFailure::Io)?;
        let mut audio = std::pin::pin!(audio);
        let mut size = 0u64;

        while let Some(chunk) = audio.next().await {
            let chunk = chunk.map_err(WriteFailure::Source)?;
            file.write_all(&chunk).await.map_err(WriteFailure::Io)?;
            size += chunk.len() as u64;
        }

        file.flush().await.map_err(WriteFailure::Io)?;
        file.sync_all().await.map_err(WriteFailure::Io)?;
        Ok(size)
    }

    /// Read a stored artifact. `None` when nothing was generated under this id.
    pub async fn read(&self, task_id: &TaskId) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(task_id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Open a stored artifact for streaming, along with its size.
    /// `None` when nothing was generated under this id.
    pub async fn open_artifact(&self, task_id: &TaskId) -> io::Result<Option<(fs::File, u64)>> {
        let path = self.path_for(task_id);
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(Some((file, metadata.len())))
    }

    /// Remove a stored artifact; removing a missing one is not an error
    pub async fn remove(&self, task_id: &TaskId) -> io::Result<()> {
        match fs::remove_file(self.path_for(task_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

async fn discard(partial: &Path) {
    if let Err(e) = fs::remove_file(partial).await {
        if e.kind() != io::ErrorKind::NotFound {
            warn!("Failed to remove partial audio file {}: {}", partial.display(), e);
        }
    }
}
