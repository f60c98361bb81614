use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Raw HTTP answer for one document URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub status: u16,
    /// Body, only kept for a 200 answer
    pub bytes: Vec<u8>,
}

impl Fetched {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Where tender documents are downloaded from
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch a document. A non-200 status is an `Ok`; only transport failures are errors.
    async fn fetch(&self, url: &str) -> Result<Fetched>;
}

/// Plain HTTP GET, no explicit timeout
pub struct HttpDocumentSource {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpDocumentSource {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            retry,
        }
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, url: &str) -> Result<Fetched> {
        let client = &self.client;
        self.retry
            .run(url, move || async move {
                let response = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("Failed to download {}", url))?;

                let status = response.status().as_u16();
                let bytes = if status == 200 {
                    response
                        .bytes()
                        .await
                        .with_context(|| format!("Failed to read body of {}", url))?
                        .to_vec()
                } else {
                    Vec::new()
                };

                Ok::<_, anyhow::Error>(Fetched { status, bytes })
            })
            .await
    }
}

/// Local copy of downloaded documents
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a document under its file name, creating the directory on demand
    pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create download dir: {}", self.dir.display()))?;

        // Never let a crafted name escape the download dir
        let file_name = Path::new(name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| crate::constants::FALLBACK_FILE_NAME.into());
        let path = self.dir.join(file_name);

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write document: {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_source_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/docs/notice.pdf")
            .with_status(200)
            .with_body("%PDF-1.4")
            .create_async()
            .await;
        let source = HttpDocumentSource::new(RetryPolicy::none());

        let fetched = source
            .fetch(&format!("{}/docs/notice.pdf", server.url()))
            .await
            .unwrap();
        assert!(fetched.is_ok());
        assert_eq!(fetched.bytes, b"%PDF-1.4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_source_not_found_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.pdf")
            .with_status(404)
            .with_body("missing")
            .create_async()
            .await;
        let source = HttpDocumentSource::new(RetryPolicy::none());

        let fetched = source.fetch(&format!("{}/gone.pdf", server.url())).await.unwrap();
        assert_eq!(fetched.status, 404);
        assert!(fetched.bytes.is_empty());
    }

    #[tokio::test]
    async fn test_http_source_transport_error() {
        let source = HttpDocumentSource::new(RetryPolicy::none());
        let err = source.fetch("http://127.0.0.1:1/nothing.pdf").await.unwrap_err();
        assert!(err.to_string().contains("Failed to download"));
    }

    #[tokio::test]
    async fn test_store_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("downloads"));

        let path = store.save("notice.pdf", b"bytes").await.unwrap();
        assert_eq!(path, dir.path().join("downloads").join("notice.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn test_store_keeps_files_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());

        let path = store.save("../../etc/passwd", b"x").await.unwrap();
        assert_eq!(path, dir.path().join("passwd"));
    }
}
