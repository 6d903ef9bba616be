use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub version: String,    // reported to the platform, e.g. "yolov8-1.0.0"
    pub onnx_path: String,  // filesystem path
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoloParams {
    pub input_size: u32,        // 640 typical
    pub conf_threshold: f32,    // 0..1
    pub iou_threshold: f32,     // 0..1
    pub max_detections: usize,  // e.g. 300
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.3,
            iou_threshold: 0.45,
            max_detections: 300,
        }
    }
}

impl YoloParams {
    pub fn validate(&self) -> DomainResult<()> {
        if self.input_size == 0 {
            return Err(DomainError::InvalidInput("input size must be positive".into()));
        }
        for (name, value) in [("conf", self.conf_threshold), ("iou", self.iou_threshold)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidInput(format!(
                    "{name} threshold {value} outside 0..1"
                )));
            }
        }
        Ok(())
    }
}
