use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ObjectStorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Object too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },
}

pub type ObjectStorageResult<T> = Result<T, ObjectStorageError>;

/// Metadata returned after an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub content_type: String,
}

/// Binary object storage addressed by slash-separated keys.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `data` under `key`, replacing any previous object.
    async fn put_object(&self, key: &str, data: Vec<u8>) -> ObjectStorageResult<StoredObject>;

    async fn get_object(&self, key: &str) -> ObjectStorageResult<Vec<u8>>;

    /// Removes an object. A missing object counts as removed.
    async fn delete_object(&self, key: &str) -> ObjectStorageResult<()>;
}

/// Content type sniffed from the payload's magic bytes.
pub fn detect_content_type(data: &[u8]) -> String {
    infer::get(data)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

/// True when the payload looks like an image.
pub fn is_image(data: &[u8]) -> bool {
    detect_content_type(data)
        .parse::<mime::Mime>()
        .map(|m| m.type_() == mime::IMAGE)
        .unwrap_or(false)
}

/// Object storage on the local filesystem.
pub struct LocalObjectStorage {
    base_path: PathBuf,
    max_object_size: usize,
}

impl LocalObjectStorage {
    pub const DEFAULT_MAX_OBJECT_SIZE: usize = 5 * 1024 * 1024;

    /// Creates the storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> io::Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            max_object_size: Self::DEFAULT_MAX_OBJECT_SIZE,
        })
    }

    pub fn with_max_object_size(mut self, limit: usize) -> Self {
        self.max_object_size = limit;
        self
    }

    /// Sanitizes a key component to prevent directory traversal issues.
    fn sanitize_component(component: &str) -> ObjectStorageResult<&str> {
        if component.is_empty()
            || component.contains('\\')
            || component == "."
            || component == ".."
        {
            Err(ObjectStorageError::InvalidKey(component.to_string()))
        } else {
            Ok(component)
        }
    }

    fn resolve(&self, key: &str) -> ObjectStorageResult<PathBuf> {
        if key.is_empty() || key.starts_with('/') {
            return Err(ObjectStorageError::InvalidKey(key.to_string()));
        }
        let mut path = self.base_path.clone();
        for component in key.split('/') {
            path.push(Self::sanitize_component(component)?);
        }
        // only normal components may remain
        let relative = path
            .strip_prefix(&self.base_path)
            .map_err(|_| ObjectStorageError::PermissionDenied(key.to_string()))?;
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(ObjectStorageError::PermissionDenied(key.to_string()));
        }
        Ok(path)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put_object(&self, key: &str, data: Vec<u8>) -> ObjectStorageResult<StoredObject> {
        if data.len() > self.max_object_size {
            return Err(ObjectStorageError::TooLarge {
                size: data.len(),
                limit: self.max_object_size,
            });
        }
        let absolute_path = self.resolve(key)?;
        if let Some(parent) = absolute_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content_type = detect_content_type(&data);
        let size = data.len() as u64;
        fs::write(&absolute_path, data).await?;

        Ok(StoredObject {
            key: key.to_string(),
            size,
            content_type,
        })
    }

    async fn get_object(&self, key: &str) -> ObjectStorageResult<Vec<u8>> {
        let absolute_path = self.resolve(key)?;
        match fs::read(&absolute_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ObjectStorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(ObjectStorageError::Io(e)),
        }
    }

    async fn delete_object(&self, key: &str) -> ObjectStorageResult<()> {
        let absolute_path = self.resolve(key)?;
        match fs::remove_file(&absolute_path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ObjectStorageError::Io(e)),
        }
    }
}
