use crate::api::error;

/// Write-once blob storage. `put` returns the public URL of the stored object.
#[async_trait::async_trait]
pub trait BlobStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, error::SystemError>;
}
