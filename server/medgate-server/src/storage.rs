//! Filesystem storage for verification documents

use crate::error::ApiError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

/// Accepted content types and the extension stored on disk
const ALLOWED_TYPES: [(&str, &str); 3] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("application/pdf", "pdf"),
];

#[derive(Debug, Clone)]
pub struct DocumentStorage {
    base_path: PathBuf,
    max_bytes: usize,
}

impl DocumentStorage {
    pub fn new(base_path: impl AsRef<Path>, max_bytes: usize) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub async fn initialize(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.base_path).await
    }

    /// Extension for an accepted content type
    pub fn extension_for(content_type: &str) -> Option<&'static str> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        ALLOWED_TYPES
            .iter()
            .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
            .map(|(_, ext)| *ext)
    }

    /// Check type and size before anything is written
    pub fn check(&self, content_type: &str, len: usize) -> Result<&'static str, ApiError> {
        let extension = Self::extension_for(content_type).ok_or_else(|| ApiError::UnsupportedMediaType {
            message: "Document must be a JPEG, PNG or PDF file".to_string(),
        })?;
        if len == 0 {
            return Err(ApiError::field("document", "Document is empty"));
        }
        if len > self.max_bytes {
            return Err(ApiError::PayloadTooLarge {
                message: format!("Document exceeds the {} byte limit", self.max_bytes),
            });
        }
        Ok(extension)
    }

    /// Write the document under a fresh name and return its stored path
    pub async fn store(&self, content_type: &str, data: &[u8]) -> Result<String, ApiError> {
        let extension = self.check(content_type, data.len())?;
        let path = self.base_path.join(format!("{}.{}", Uuid::new_v4(), extension));

        self.initialize()
            .await
            .map_err(|e| ApiError::internal(format!("failed to create upload directory: {}", e)))?;
        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| ApiError::internal(format!("failed to create {}: {}", path.display(), e)))?;
        file.write_all(data)
            .await
            .map_err(|e| ApiError::internal(format!("failed to write {}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| ApiError::internal(format!("failed to flush {}: {}", path.display(), e)))?;

        info!(bytes = data.len(), path = %path.display(), "Verification document stored");
        Ok(path.to_string_lossy().into_owned())
    }

    /// Best-effort cleanup when the document could not be attached
    pub async fn discard(&self, stored_path: &str) {
        if let Err(e) = fs::remove_file(stored_path).await {
            tracing::warn!(error = %e, path = stored_path, "Failed to remove orphaned document");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for() {
        assert_eq!(DocumentStorage::extension_for("image/png"), Some("png"));
        assert_eq!(DocumentStorage::extension_for("application/PDF"), Some("pdf"));
        assert_eq!(DocumentStorage::extension_for("image/jpeg; charset=binary"), Some("jpg"));
        assert_eq!(DocumentStorage::extension_for("text/plain"), None);
    }

    #[tokio::test]
    async fn test_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DocumentStorage::new(dir.path().join("docs"), 16);

        let path = storage.store("application/pdf", b"%PDF-1.4").await.unwrap();
        assert!(path.ends_with(".pdf"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF-1.4");

        storage.discard(&path).await;
        assert!(tokio::fs::metadata(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_and_wrong_type_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DocumentStorage::new(dir.path(), 4);

        let err = storage.store("image/png", b"too large").await.unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge { .. }));

        let err = storage.store("text/plain", b"x").await.unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMediaType { .. }));
    }
}
