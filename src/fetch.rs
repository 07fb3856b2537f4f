use crate::error::{Result, StartError};
use crate::start::Fetcher;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Downloads over HTTP(S); anything but a 2xx response is a failure.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let failed = |reason: String| StartError::Download {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?
            .error_for_status()
            .map_err(|e| failed(e.to_string()))?;
        let body = resp.bytes().await.map_err(|e| failed(e.to_string()))?;
        debug!("downloaded {} bytes from {url}", body.len());

        tokio::fs::write(dest, &body)
            .await
            .map_err(|source| StartError::WriteDefinition {
                path: dest.to_path_buf(),
                source,
            })
    }
}
