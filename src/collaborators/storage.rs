use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct StorageError(pub String);

/// Blob storage port. The core only constructs deterministic keys
/// (`companies/<tenantId>/visitors/<code>.jpg`, `companies/<slug>/logo.<ext>`)
/// and treats upload failure as a hard failure of the enclosing operation.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        key: &str,
    ) -> Result<String, StorageError>;
}

/// Local-disk storage used in development; production deployments plug an
/// object-store implementation into the same port.
pub struct LocalStorage {
    root_dir: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl BlobStorage for LocalStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        _content_type: &str,
        key: &str,
    ) -> Result<String, StorageError> {
        let path = self.root_dir.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError(format!("create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError(format!("write {}: {}", path.display(), e)))?;

        Ok(format!("{}/{}", self.public_base_url.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_writes_file_and_returns_public_url() {
        let dir = std::env::temp_dir().join(format!("visitflow-storage-{}", std::process::id()));
        let storage = LocalStorage::new(&dir, "http://localhost:8000/storage/");

        let url = storage
            .upload(b"jpeg-bytes".to_vec(), "image/jpeg", "companies/7/visitors/x.jpg")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8000/storage/companies/7/visitors/x.jpg");
        let written = std::fs::read(dir.join("companies/7/visitors/x.jpg")).unwrap();
        assert_eq!(written, b"jpeg-bytes");

        std::fs::remove_dir_all(&dir).ok();
    }
}
