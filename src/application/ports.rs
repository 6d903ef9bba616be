use async_trait::async_trait;
use image::{DynamicImage, RgbImage};

use crate::domain::{detection::Detection, errors::DomainResult};

/// Object detector loaded at startup. Returns boxes in the pixel space of
/// the image it was given.
#[async_trait]
pub trait DetectorPort: Send + Sync {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>>;
}

/// Resolves the image reference carried by a task (URL or local path).
#[async_trait]
pub trait ImageSourcePort: Send + Sync {
    async fn load(&self, reference: &str) -> DomainResult<DynamicImage>;
}
