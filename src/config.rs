use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::{
    annotation::FieldBinding,
    errors::DomainResult,
    model::{ModelId, YoloParams},
};

/// Serves a YOLO ONNX model as an ML backend for the annotation platform.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "ML_BACKEND_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "ML_BACKEND_PORT", default_value_t = 9090)]
    pub port: u16,

    /// ONNX export of the detection model.
    #[arg(long, env = "ML_BACKEND_MODEL", default_value = "best.onnx")]
    pub model: String,

    /// Class names: dataset YAML (`names:`) or one label per line.
    #[arg(long, env = "ML_BACKEND_LABELS")]
    pub labels: Option<PathBuf>,

    #[arg(long, env = "ML_BACKEND_MODEL_VERSION", default_value = "yolov8-1.0.0")]
    pub model_version: String,

    /// Minimum confidence for a detection to be reported.
    #[arg(long, env = "ML_BACKEND_CONF", default_value_t = 0.3)]
    pub conf: f32,

    /// IoU above which overlapping boxes of one class are suppressed.
    #[arg(long, env = "ML_BACKEND_IOU", default_value_t = 0.45)]
    pub iou: f32,

    /// Square input size the model was exported with.
    #[arg(long, env = "ML_BACKEND_IMGSZ", default_value_t = 640)]
    pub imgsz: u32,

    #[arg(long, env = "ML_BACKEND_MAX_DET", default_value_t = 300)]
    pub max_det: usize,

    /// `from_name` of the RectangleLabels control in the labeling config.
    #[arg(long, env = "ML_BACKEND_FROM_NAME", default_value = "label")]
    pub from_name: String,

    /// `to_name` (the Image object) in the labeling config.
    #[arg(long, env = "ML_BACKEND_TO_NAME", default_value = "image")]
    pub to_name: String,

    /// Image download timeout in seconds.
    #[arg(long, env = "ML_BACKEND_FETCH_TIMEOUT", default_value_t = 30)]
    pub fetch_timeout: u64,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_id(&self) -> ModelId {
        ModelId { version: self.model_version.clone(), onnx_path: self.model.clone() }
    }

    pub fn yolo_params(&self) -> DomainResult<YoloParams> {
        let params = YoloParams {
            input_size: self.imgsz,
            conf_threshold: self.conf,
            iou_threshold: self.iou,
            max_detections: self.max_det,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn field_binding(&self) -> DomainResult<FieldBinding> {
        FieldBinding::new(&self.from_name, &self.to_name)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}
