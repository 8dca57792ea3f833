use std::path::PathBuf;

use crate::api::error;
use crate::modules::media::model::MediaFolder;
use crate::modules::media::repository::BlobStore;

/// Blobs on local disk, served back through `GET /uploads/{folder}/{file}`.
#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self { root: root.into(), public_base_url: public_base_url.trim_end_matches('/').to_string() }
    }

    /// Reads back a stored blob. Names that could leave the folder are treated as missing.
    pub async fn read(&self, folder: MediaFolder, file: &str) -> Result<Vec<u8>, error::SystemError> {
        if file.is_empty() || file.starts_with('.') || file.contains(&['/', '\\'][..]) {
            return Err(error::SystemError::not_found("File not found"));
        }

        match tokio::fs::read(self.root.join(folder.as_str()).join(file)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(error::SystemError::not_found("File not found"))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, error::SystemError> {
        let file_path = self.root.join(path);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file_path, &bytes).await?;

        Ok(format!("{}/uploads/{}", self.public_base_url, path))
    }
}
