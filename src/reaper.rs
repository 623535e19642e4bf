//! Time-based cleanup of local audio artifacts.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::storage::PARTIAL_SUFFIX;

fn is_artifact(name: &str) -> bool {
    name.ends_with(".mp3") || name.ends_with(&format!(".mp3{}", PARTIAL_SUFFIX))
}

/// Age of a regular file at `path`. `None` once the file is gone, or when
/// the entry is not a regular file.
async fn artifact_age(path: &Path, now: SystemTime) -> io::Result<Option<Duration>> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        // Removed by a request or another sweep since read_dir listed it
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    if !metadata.is_file() {
        return Ok(None);
    }
    let modified = metadata.modified()?;
    Ok(Some(now.duration_since(modified).unwrap_or(Duration::ZERO)))
}

/// Delete artifacts (and abandoned partial writes) at least `ttl` old.
/// Returns how many files were removed.
pub async fn sweep_expired(dir: &Path, ttl: Duration) -> io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !is_artifact(name) {
            continue;
        }

        let age = match artifact_age(&entry.path(), now).await {
            Ok(Some(age)) => age,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                continue;
            }
        };
        if age < ttl {
            continue;
        }

        match fs::remove_file(entry.path()).await {
            Ok(()) => {
                debug!("Reaped {} (age {:?})", name, age);
                removed += 1;
            }
            // Another sweep or request got there first
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to reap {}: {}", name, e),
        }
    }

    Ok(removed)
}

/// Sweep `dir` every `interval` for the lifetime of the process
pub fn spawn(dir: PathBuf, ttl: Duration, interval: Duration) -> JoinHandle<()> {
    info!(
        "Reaping audio in {} older than {:?} every {:?}",
        dir.display(),
        ttl,
        interval
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match sweep_expired(&dir, ttl).await {
                Ok(0) => {}
                Ok(n) => info!("Reaped {} expired audio files", n),
                Err(e) => warn!("Audio reaper sweep failed: {}", e),
            }
        }
    })
}
