use async_trait::async_trait;
use image::DynamicImage;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::ImageSourcePort;
use crate::domain::errors::{DomainError, DomainResult};

/// Loads task images from `http(s)` URLs or from the local filesystem.
pub struct ImageLoader {
    client: reqwest::Client,
}

impl ImageLoader {
    pub fn new(timeout: Duration) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::OperationFailed(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    async fn download(&self, url: &str) -> DomainResult<DynamicImage> {
        debug!(%url, "downloading image");
        let res = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| DomainError::UpstreamFetch(format!("{url}: {e}")))?;
        let bytes = res
            .bytes()
            .await
            .map_err(|e| DomainError::UpstreamFetch(format!("{url}: {e}")))?;

        tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("decode task: {e}")))?
            .map_err(|e| DomainError::Decode(format!("{url}: {e}")))
    }

    async fn open(&self, path: &str) -> DomainResult<DynamicImage> {
        debug!(%path, "opening local image");
        let owned = path.to_string();
        tokio::task::spawn_blocking(move || image::open(&owned))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("decode task: {e}")))?
            .map_err(|e| match e {
                image::ImageError::IoError(io) => DomainError::UpstreamFetch(format!("{path}: {io}")),
                other => DomainError::Decode(format!("{path}: {other}")),
            })
    }
}

pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

#[async_trait]
impl ImageSourcePort for ImageLoader {
    async fn load(&self, reference: &str) -> DomainResult<DynamicImage> {
        if reference.trim().is_empty() {
            return Err(DomainError::InvalidInput("empty image reference".into()));
        }
        if is_remote(reference) {
            self.download(reference).await
        } else {
            self.open(reference).await
        }
    }
}
