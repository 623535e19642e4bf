pub mod local;
pub mod blob;

pub use local::{LocalAudioStore, WriteFailure, PARTIAL_SUFFIX};
pub use blob::{BlobStore, ObjectBlobStore, StorageError};
