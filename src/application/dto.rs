use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::annotation::{AnnotationRecord, TaskResult};

/// One entry of the `tasks` array sent to `/predict`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub data: TaskData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectangleValue {
    pub rectanglelabels: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDto {
    pub from_name: String,
    pub to_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: RectangleValue,
    pub score: f32,
}

impl From<AnnotationRecord> for AnnotationDto {
    fn from(r: AnnotationRecord) -> Self {
        Self {
            from_name: r.from_field,
            to_name: r.to_field,
            kind: r.shape_type.wire_name().to_string(),
            value: RectangleValue {
                rectanglelabels: r.labels,
                x: r.x_pct,
                y: r.y_pct,
                width: r.width_pct,
                height: r.height_pct,
            },
            score: r.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionDto {
    pub result: Vec<AnnotationDto>,
    pub score: f32,
    pub model_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionDto {
    pub fn from_result(result: TaskResult, model_version: &str, task: Option<Value>) -> Self {
        Self {
            result: result.annotations.into_iter().map(AnnotationDto::from).collect(),
            score: result.aggregate_score,
            model_version: model_version.to_string(),
            task,
            error: None,
        }
    }

    /// Empty prediction standing in for a task that could not be processed.
    pub fn failed(model_version: &str, task: Option<Value>, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::from_result(TaskResult::empty(), model_version, task)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub results: Vec<PredictionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupResponse {
    pub model_version: String,
    pub score_threshold: f32,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}
