use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    application::{
        dto::{PredictionDto, SetupResponse, TaskRequest},
        ports::{DetectorPort, ImageSourcePort},
        settings::BackendSettings,
    },
    domain::{
        annotation::{detections_to_task_result, ensure_dimensions, TaskResult},
        errors::{DomainError, DomainResult},
    },
};

/// Outcome of a single task; failures never leave the task they belong to.
pub type TaskOutcome = DomainResult<TaskResult>;

/// Runs prediction requests: image acquisition, inference and conversion
/// into annotation records, one task at a time.
#[derive(Clone)]
pub struct PredictionService {
    detector: Arc<dyn DetectorPort>,
    images: Arc<dyn ImageSourcePort>,
    settings: Arc<BackendSettings>,
}

impl PredictionService {
    pub fn new(
        detector: Arc<dyn DetectorPort>,
        images: Arc<dyn ImageSourcePort>,
        settings: Arc<BackendSettings>,
    ) -> Self {
        Self { detector, images, settings }
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    pub fn setup(&self) -> SetupResponse {
        SetupResponse {
            model_version: self.settings.model.version.clone(),
            score_threshold: self.settings.params.conf_threshold,
            labels: self.settings.labels.names(),
        }
    }

    /// Processes every task in order. A task that fails yields an empty
    /// prediction carrying the error message; its siblings are unaffected.
    pub async fn predict(&self, tasks: Vec<Value>) -> Vec<PredictionDto> {
        let version = &self.settings.model.version;
        let mut predictions = Vec::with_capacity(tasks.len());

        for raw in tasks {
            let task_id = raw.get("id").cloned();
            let outcome = match serde_json::from_value::<TaskRequest>(raw) {
                Ok(task) => self.predict_task(&task).await,
                Err(e) => Err(DomainError::InvalidInput(format!("malformed task: {e}"))),
            };

            predictions.push(match outcome {
                Ok(result) => {
                    info!(task = ?task_id, detections = result.annotations.len(), score = result.aggregate_score, "task predicted");
                    PredictionDto::from_result(result, version, task_id)
                }
                Err(e) => {
                    error!(task = ?task_id, "task failed: {e}");
                    PredictionDto::failed(version, task_id, e.to_string())
                }
            });
        }

        predictions
    }

    pub async fn predict_task(&self, task: &TaskRequest) -> TaskOutcome {
        let reference = task
            .data
            .image
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| DomainError::InvalidInput("task has no image reference".into()))?;

        let image = self.images.load(reference).await?;
        let (width, height) = (image.width(), image.height());
        info!(%reference, width, height, "image loaded");
        ensure_dimensions(width, height)?;

        let detections = self.detector.detect(image.to_rgb8()).await?;

        detections_to_task_result(
            width,
            height,
            &detections,
            &self.settings.labels,
            &self.settings.fields,
        )
    }
}
