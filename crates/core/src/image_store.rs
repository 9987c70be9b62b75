//! Uploaded exercise images, kept outside the database.
//!
//! Images are addressed by a key derived from the owning exercise's name
//! and the upload ordinal (`{name}_{index}`). Renaming an exercise does not
//! rename images that were already stored.
//!
//! The backend is the [`ImageStore`] capability so the workflow can run
//! against [`LocalImageStore`] in production and a recording double in tests.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// A file received in a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Client-side file name, kept for diagnostics only.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Storage backend for image bytes.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing content.
    async fn save(&self, key: &str, bytes: &[u8]) -> io::Result<()>;

    /// Delete the content stored under `key`.
    async fn remove(&self, key: &str) -> io::Result<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    /// Writing one file of a batch failed. Files written before it stay in
    /// the store; their keys are listed in `saved`.
    #[error("failed to save image '{file_name}' as '{key}': {source}")]
    Save {
        key: String,
        file_name: String,
        saved: Vec<String>,
        #[source]
        source: io::Error,
    },
}

/// Derive the storage key for the `index`-th (0-based) image of an exercise.
///
/// ```
/// use liftlog_core::image_store::image_key;
///
/// assert_eq!(image_key("Squat", 0), "Squat_0");
/// assert_eq!(image_key("Squat", 1), "Squat_1");
/// ```
pub fn image_key(exercise_name: &str, index: usize) -> String {
    format!("{exercise_name}_{index}")
}

/// Save `files` in order, returning their keys.
///
/// Aborts at the first failing write without removing the files saved
/// before it.
pub async fn save_images(
    store: &dyn ImageStore,
    exercise_name: &str,
    files: &[UploadedImage],
) -> Result<Vec<String>, ImageStoreError> {
    let mut saved = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let key = image_key(exercise_name, index);
        tracing::debug!(file_name = %file.file_name, %key, "Saving image");
        if let Err(source) = store.save(&key, &file.bytes).await {
            return Err(ImageStoreError::Save {
                key,
                file_name: file.file_name.clone(),
                saved,
                source,
            });
        }
        saved.push(key);
    }
    Ok(saved)
}

/// Remove every key, continuing past failures.
///
/// Each failure is logged; the keys that could not be removed are returned.
pub async fn remove_images(store: &dyn ImageStore, keys: &[String]) -> Vec<String> {
    let mut failed = Vec::new();
    for key in keys {
        tracing::debug!(%key, "Removing image");
        if let Err(e) = store.remove(key).await {
            tracing::warn!(%key, error = %e, "Failed to remove image");
            failed.push(key.clone());
        }
    }
    failed
}

// ---------------------------------------------------------------------------
// Local filesystem backend
// ---------------------------------------------------------------------------

/// Stores each image as a file named after its key inside `base_dir`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    base_dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve `key` to a path directly inside the base directory.
    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let unsafe_key = key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\', '\0']);
        if unsafe_key {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid image key '{key}'"),
            ));
        }
        Ok(self.base_dir.join(key))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.base_dir).await?;
        tokio::fs::write(&path, bytes).await
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path).await
    }
}
