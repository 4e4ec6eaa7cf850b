//! Uploaded file storage.
//!
//! A blob store takes bytes under a key and hands back a URL clients can
//! load them from. Keys are relative slash-separated paths such as
//! `profile_photos/{user_id}/avatar.png`.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Blob storage errors.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The key is empty or escapes the storage root.
    #[error("Invalid blob key: {0}")]
    InvalidKey(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for blob storage operations.
pub type BlobResult<T> = Result<T, BlobError>;

/// Trait for blob storage backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key`, replacing any previous content, and
    /// returns the public URL.
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> BlobResult<String>;

    /// Removes the blob under `key`. Missing blobs are not an error.
    async fn delete(&self, key: &str) -> BlobResult<()>;
}

/// Returns the storage key for a user's profile photo.
///
/// Only ASCII letters, digits, `.`, `-` and `_` survive from `file_name`.
pub fn profile_photo_key(user_id: uuid::Uuid, file_name: &str) -> BlobResult<String> {
    let cleaned: String = file_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        return Err(BlobError::InvalidKey(file_name.to_string()));
    }
    Ok(format!("profile_photos/{}/{}", user_id, cleaned))
}

fn validate_key(key: &str) -> BlobResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && key
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if valid {
        Ok(())
    } else {
        Err(BlobError::InvalidKey(key.to_string()))
    }
}

/// Blob store writing into a local directory that the server also serves.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    /// Creates a store rooted at `root`, serving files under `base_url`.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> BlobResult<String> {
        validate_key(key)?;

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(key = %key, size = bytes.len(), "Blob stored");

        Ok(format!("{}/{}", self.base_url, key))
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        validate_key(key)?;

        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory blob store (for testing).
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes stored under `key`.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(key).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> BlobResult<String> {
        validate_key(key)?;
        self.blobs.write().await.insert(key.to_string(), bytes);
        Ok(format!("memory://{}", key))
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        validate_key(key)?;
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_photo_key() {
        let user_id = uuid::Uuid::new_v4();
        assert_eq!(
            profile_photo_key(user_id, "me.png").unwrap(),
            format!("profile_photos/{}/me.png", user_id)
        );
        assert_eq!(
            profile_photo_key(user_id, "../../etc/passwd").unwrap(),
            format!("profile_photos/{}/etcpasswd", user_id)
        );
        assert!(profile_photo_key(user_id, "///").is_err());
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("a/b.png").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/abs").is_err());
        assert!(validate_key("a/../b").is_err());
        assert!(validate_key("a//b").is_err());
    }

    #[tokio::test]
    async fn test_local_upload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:5000/uploads/");

        let url = store
            .upload("profile_photos/u1/me.png", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:5000/uploads/profile_photos/u1/me.png");
        let written = std::fs::read(dir.path().join("profile_photos/u1/me.png")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);

        store.delete("profile_photos/u1/me.png").await.unwrap();
        assert!(!dir.path().join("profile_photos/u1/me.png").exists());
        store.delete("profile_photos/u1/me.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_upload_replaces() {
        let store = MemoryBlobStore::new();
        store.upload("k", vec![1]).await.unwrap();
        store.upload("k", vec![2]).await.unwrap();
        assert_eq!(store.get("k").await, Some(vec![2]));
    }
}
