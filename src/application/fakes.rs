//! In-memory ports for tests.

use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{DetectorPort, ImageSourcePort};
use crate::application::settings::BackendSettings;
use crate::domain::{
    annotation::FieldBinding,
    detection::Detection,
    errors::{DomainError, DomainResult},
    labels::ClassLabelTable,
    model::{ModelId, YoloParams},
};

pub fn settings() -> BackendSettings {
    BackendSettings {
        model: ModelId { version: "test-model".into(), onnx_path: "unused.onnx".into() },
        params: YoloParams::default(),
        labels: ClassLabelTable::from_names(["cat", "dog"]),
        fields: FieldBinding::default(),
    }
}

pub struct FakeDetector {
    detections: Option<Vec<Detection>>,
    calls: AtomicUsize,
}

impl FakeDetector {
    pub fn returning(detections: Vec<Detection>) -> Self {
        Self { detections: Some(detections), calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { detections: None, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DetectorPort for FakeDetector {
    async fn detect(&self, _image: RgbImage) -> DomainResult<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.detections
            .clone()
            .ok_or_else(|| DomainError::Inference("fake detector failure".into()))
    }
}

#[derive(Default)]
pub struct FakeImages {
    sizes: HashMap<String, (u32, u32)>,
}

impl FakeImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, reference: &str, width: u32, height: u32) -> Self {
        self.sizes.insert(reference.to_string(), (width, height));
        self
    }
}

#[async_trait]
impl ImageSourcePort for FakeImages {
    async fn load(&self, reference: &str) -> DomainResult<DynamicImage> {
        let (w, h) = self
            .sizes
            .get(reference)
            .copied()
            .ok_or_else(|| DomainError::UpstreamFetch(format!("no such image: {reference}")))?;
        Ok(DynamicImage::ImageRgb8(RgbImage::new(w, h)))
    }
}
