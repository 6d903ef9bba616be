use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

/// Raw model output for one object, in source-image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
}

impl Detection {
    /// Number of values in a raw row: `[x1, y1, x2, y2, score, class_id]`.
    pub const ROW_LEN: usize = 6;

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }
}

/// Entry point for raw model rows; the ONNX decoder builds every detection
/// through it.
impl TryFrom<&[f32]> for Detection {
    type Error = DomainError;

    fn try_from(row: &[f32]) -> DomainResult<Self> {
        let [x1, y1, x2, y2, score, class] = row else {
            return Err(DomainError::Precondition(format!(
                "detection row must have {} values, got {}",
                Self::ROW_LEN,
                row.len()
            )));
        };
        if !class.is_finite() || *class < 0.0 {
            return Err(DomainError::Precondition(format!("invalid class id {class}")));
        }
        Ok(Self {
            x1: *x1,
            y1: *y1,
            x2: *x2,
            y2: *y2,
            score: *score,
            class_id: *class as usize,
        })
    }
}
