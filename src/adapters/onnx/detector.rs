use async_trait::async_trait;
use image::RgbImage;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::DetectorPort;
use crate::domain::{
    detection::Detection,
    errors::{DomainError, DomainResult},
    model::YoloParams,
};

/// Shares one ONNX session between requests. Runs hold the session
/// exclusively, on the blocking pool.
pub struct OnnxDetector {
    engine: Arc<Mutex<OnnxYoloEngine>>,
    params: YoloParams,
}

impl OnnxDetector {
    pub fn new(engine: OnnxYoloEngine, params: YoloParams) -> Self {
        Self { engine: Arc::new(Mutex::new(engine)), params }
    }
}

/// Locks the session even after a run panicked while holding it. The
/// session keeps no state between runs.
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(|poisoned| {
        warn!("inference session lock was poisoned; reusing session");
        session.clear_poison();
        poisoned.into_inner()
    })
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>> {
        let engine = self.engine.clone();
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || -> DomainResult<Vec<Detection>> {
            let t_infer_start = std::time::Instant::now();
            let mut engine = lock_session(&engine);
            let detections = engine
                .infer(&image, &params)
                .map_err(|e| DomainError::Inference(format!("{e:#}")))?;
            debug!(
                infer_ms = t_infer_start.elapsed().as_secs_f32() * 1000.0,
                count = detections.len(),
                "inference done"
            );
            Ok(detections)
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("inference task: {e}")))?
    }
}
