/// Blob Relay
///
/// Re-hosts media in blob storage so message rows never depend on the
/// gateway's short-lived URLs.
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::media::model::MediaFolder;
use crate::modules::media::repository::BlobStore;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Clone)]
pub struct BlobRelay {
    store: Arc<dyn BlobStore + Send + Sync>,
    client: reqwest::Client,
    max_bytes: usize,
}

impl BlobRelay {
    pub fn new(
        store: Arc<dyn BlobStore + Send + Sync>,
        max_bytes: usize,
    ) -> Result<Self, error::SystemError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { store, client, max_bytes })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stores `bytes` under a fresh unique name in `folder` and returns its public URL.
    pub async fn upload_from_buffer(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        folder: MediaFolder,
    ) -> Result<String, error::SystemError> {
        if bytes.is_empty() {
            return Err(error::SystemError::bad_request("Empty media file"));
        }
        if bytes.len() > self.max_bytes {
            return Err(error::SystemError::bad_request(format!(
                "File size exceeds maximum allowed size of {} bytes",
                self.max_bytes
            )));
        }

        let content_type = resolve_content_type(filename, content_type);
        let path = format!("{}/{}", folder, unique_name(filename, &content_type));

        let url = self.store.put(&path, bytes, &content_type).await?;
        tracing::debug!(%path, %content_type, "blob stored");

        Ok(url)
    }

    /// Fetches a remote file and re-uploads it into `folder`.
    pub async fn download_and_upload(
        &self,
        external_url: &str,
        folder: MediaFolder,
    ) -> Result<String, error::SystemError> {
        let mut response = self.client.get(external_url).send().await?.error_for_status()?;

        if response.content_length().is_some_and(|len| len as usize > self.max_bytes) {
            return Err(self.too_large());
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| OCTET_STREAM.to_string());

        let filename = response
            .url()
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("file-{}", chrono::Utc::now().timestamp_millis()));

        // Chunked bodies carry no Content-Length, so the bound is checked while reading.
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        self.upload_from_buffer(bytes, &filename, &content_type, folder).await
    }

    fn too_large(&self) -> error::SystemError {
        error::SystemError::storage(format!("remote media exceeds {} bytes", self.max_bytes))
    }
}

fn resolve_content_type(filename: &str, content_type: &str) -> String {
    if content_type.is_empty() || content_type == OCTET_STREAM {
        mime_guess::from_path(filename).first_or_octet_stream().to_string()
    } else {
        content_type.to_string()
    }
}

fn unique_name(filename: &str, content_type: &str) -> String {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .or_else(|| {
            mime_guess::get_mime_extensions_str(content_type).and_then(|exts| exts.first().copied())
        });

    let uuid = Uuid::now_v7();
    match extension {
        Some(ext) => format!("{uuid}.{ext}"),
        None => uuid.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::media::repository_fs::LocalBlobStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn relay(dir: &Path, max_bytes: usize) -> BlobRelay {
        let store = Arc::new(LocalBlobStore::new(dir, "http://localhost:8080"));
        BlobRelay::new(store, max_bytes).unwrap()
    }

    fn stored_path(dir: &Path, url: &str) -> std::path::PathBuf {
        dir.join(url.trim_start_matches("http://localhost:8080/uploads/"))
    }

    #[tokio::test]
    async fn test_upload_from_buffer_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let relay = relay(dir.path(), 1024);

        let url = relay
            .upload_from_buffer(b"pdf".to_vec(), "invoice.pdf", "application/pdf", MediaFolder::Documents)
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:8080/uploads/documents/"));
        assert!(url.ends_with(".pdf"));
        assert_eq!(std::fs::read(stored_path(dir.path(), &url)).unwrap(), b"pdf");
    }

    #[tokio::test]
    async fn test_upload_from_buffer_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let relay = relay(dir.path(), 1024);

        let a = relay
            .upload_from_buffer(b"a".to_vec(), "photo.jpg", "image/jpeg", MediaFolder::Images)
            .await
            .unwrap();
        let b = relay
            .upload_from_buffer(b"b".to_vec(), "photo.jpg", "image/jpeg", MediaFolder::Images)
            .await
            .unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_upload_from_buffer_rejects_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let relay = relay(dir.path(), 4);

        let result = relay
            .upload_from_buffer(b"too large".to_vec(), "a.txt", "text/plain", MediaFolder::Documents)
            .await;

        assert!(matches!(result, Err(error::SystemError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_download_and_upload_relays_remote_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/voice.ogg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "audio/ogg; codecs=opus")
                    .set_body_bytes(b"opus".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let relay = relay(dir.path(), 1024);

        let url = relay
            .download_and_upload(&format!("{}/media/voice.ogg", server.uri()), MediaFolder::Audios)
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:8080/uploads/audios/"));
        assert!(url.ends_with(".ogg"));
        assert_eq!(std::fs::read(stored_path(dir.path(), &url)).unwrap(), b"opus");
    }

    #[tokio::test]
    async fn test_download_and_upload_fails_on_missing_remote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let result = relay(dir.path(), 1024)
            .download_and_upload(&format!("{}/media/gone.jpg", server.uri()), MediaFolder::Images)
            .await;

        assert!(matches!(result, Err(error::SystemError::Http(_))));
    }

    #[tokio::test]
    async fn test_download_and_upload_bounds_chunked_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // No Content-Length: the body arrives as four 8-byte chunks.
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let mut response = String::from(
                "HTTP/1.1 200 OK\r\ncontent-type: image/jpeg\r\ntransfer-encoding: chunked\r\n\r\n",
            );
            for _ in 0..4 {
                response.push_str("8\r\nAAAAAAAA\r\n");
            }
            response.push_str("0\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
        });

        let dir = tempfile::tempdir().unwrap();
        let result = relay(dir.path(), 16)
            .download_and_upload(&format!("http://{addr}/media/big.jpg"), MediaFolder::Images)
            .await;

        assert!(matches!(result, Err(error::SystemError::Storage(_))));
        let stored = std::fs::read_dir(dir.path().join("images"))
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(stored, 0);
    }

    #[test]
    fn test_octet_stream_is_guessed_from_filename() {
        assert_eq!(resolve_content_type("a.png", OCTET_STREAM), "image/png");
        assert_eq!(resolve_content_type("a.png", "image/webp"), "image/webp");
    }
}
