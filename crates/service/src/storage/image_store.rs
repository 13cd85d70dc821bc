use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("invalid image name: {0}")]
    InvalidName(String),
    #[error("io failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of an exclusive create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Written,
    /// A file with that name already existed; nothing was written.
    Collision,
}

/// Binary asset persistence keyed by a flat file name.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool, ImageStoreError>;

    /// Plain write. Overwrites whatever is at `name`.
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), ImageStoreError>;

    /// Atomic create-exclusive write: never replaces an existing file.
    async fn create_new(&self, name: &str, bytes: &[u8]) -> Result<StoreOutcome, ImageStoreError>;

    async fn list(&self) -> Result<Vec<String>, ImageStoreError>;

    /// Remove a stored file; returns whether it existed.
    async fn remove(&self, name: &str) -> Result<bool, ImageStoreError>;
}

/// Accepts only a single path component inside the image directory.
/// Dots inside a name (`photo..v2.png`) are fine.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Image store rooted at one directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self { Self { root: root.into() } }

    /// Create the root directory if needed.
    pub async fn open<P: Into<PathBuf>>(root: P) -> Result<Self, ImageStoreError> {
        let store = Self::new(root);
        fs::create_dir_all(&store.root).await.map_err(|source| ImageStoreError::Io {
            path: store.root.display().to_string(),
            source,
        })?;
        Ok(store)
    }

    pub fn root(&self) -> &std::path::Path { &self.root }

    fn path_for(&self, name: &str) -> Result<PathBuf, ImageStoreError> {
        if !is_safe_name(name) {
            return Err(ImageStoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

fn io_err(path: &std::path::Path, source: std::io::Error) -> ImageStoreError {
    ImageStoreError::Io { path: path.display().to_string(), source }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn exists(&self, name: &str) -> Result<bool, ImageStoreError> {
        let path = self.path_for(name)?;
        fs::try_exists(&path).await.map_err(|e| io_err(&path, e))
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), ImageStoreError> {
        let path = self.path_for(name)?;
        fs::write(&path, bytes).await.map_err(|e| io_err(&path, e))
    }

    async fn create_new(&self, name: &str, bytes: &[u8]) -> Result<StoreOutcome, ImageStoreError> {
        let path = self.path_for(name)?;
        let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(image = %name, "image name already taken");
                return Ok(StoreOutcome::Collision);
            }
            Err(e) => return Err(io_err(&path, e)),
        };

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            // The name is ours; drop the partial file so a retry can reuse it.
            drop(file);
            if let Err(rm) = fs::remove_file(&path).await {
                warn!(image = %name, error = %rm, "could not remove partially written image");
            }
            return Err(io_err(&path, e));
        }
        Ok(StoreOutcome::Written)
    }

    async fn list(&self) -> Result<Vec<String>, ImageStoreError> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| io_err(&self.root, e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_err(&self.root, e))? {
            let file_type = entry.file_type().await.map_err(|e| io_err(&entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn remove(&self, name: &str) -> Result<bool, ImageStoreError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err(&path, e)),
        }
    }
}
