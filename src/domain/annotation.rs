use tracing::warn;

use super::detection::Detection;
use super::errors::{DomainError, DomainResult};
use super::labels::ClassLabelTable;

/// Control names in the labeling config that a prediction is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    pub from_field: String,
    pub to_field: String,
}

impl FieldBinding {
    pub fn new(from_field: impl Into<String>, to_field: impl Into<String>) -> DomainResult<Self> {
        let (from_field, to_field) = (from_field.into(), to_field.into());
        if from_field.trim().is_empty() || to_field.trim().is_empty() {
            return Err(DomainError::Precondition("field names must be non-empty".into()));
        }
        Ok(Self { from_field, to_field })
    }
}

impl Default for FieldBinding {
    fn default() -> Self {
        Self { from_field: "label".into(), to_field: "image".into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Rectangle,
}

impl ShapeType {
    /// Result type name understood by the platform.
    pub fn wire_name(self) -> &'static str {
        match self {
            ShapeType::Rectangle => "rectanglelabels",
        }
    }
}

/// One rectangle in percent of the image size, top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub shape_type: ShapeType,
    pub from_field: String,
    pub to_field: String,
    pub labels: Vec<String>,
    pub x_pct: f64,
    pub y_pct: f64,
    pub width_pct: f64,
    pub height_pct: f64,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskResult {
    pub annotations: Vec<AnnotationRecord>,
    pub aggregate_score: f32,
}

impl TaskResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Converts pixel-space detections of a `width`x`height` image into
/// percentage rectangles. Coordinates are scaled linearly and never clamped,
/// so boxes that leave the image produce values outside 0..100.
pub fn detections_to_task_result(
    width: u32,
    height: u32,
    detections: &[Detection],
    labels: &ClassLabelTable,
    fields: &FieldBinding,
) -> DomainResult<TaskResult> {
    ensure_dimensions(width, height)?;
    let (w, h) = (f64::from(width), f64::from(height));

    let annotations: Vec<AnnotationRecord> = detections
        .iter()
        .map(|det| AnnotationRecord {
            shape_type: ShapeType::Rectangle,
            from_field: fields.from_field.clone(),
            to_field: fields.to_field.clone(),
            labels: vec![resolve_label(labels, det.class_id)],
            x_pct: f64::from(det.x1) / w * 100.0,
            y_pct: f64::from(det.y1) / h * 100.0,
            width_pct: f64::from(det.x2 - det.x1) / w * 100.0,
            height_pct: f64::from(det.y2 - det.y1) / h * 100.0,
            score: det.score,
        })
        .collect();

    let aggregate_score = mean_score(&annotations);
    Ok(TaskResult { annotations, aggregate_score })
}

/// Rejects images that cannot be converted to percentages.
pub fn ensure_dimensions(width: u32, height: u32) -> DomainResult<()> {
    if width == 0 || height == 0 {
        return Err(DomainError::Precondition(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

fn resolve_label(labels: &ClassLabelTable, class_id: usize) -> String {
    match labels.get(class_id) {
        Some(name) => name.to_owned(),
        None => {
            warn!(class_id, "class id missing from label table");
            format!("unknown_class_{class_id}")
        }
    }
}

fn mean_score(annotations: &[AnnotationRecord]) -> f32 {
    if annotations.is_empty() {
        return 0.0;
    }
    let sum: f64 = annotations.iter().map(|a| f64::from(a.score)).sum();
    (sum / annotations.len() as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: usize) -> Detection {
        Detection { x1, y1, x2, y2, score, class_id }
    }

    fn cat_dog() -> ClassLabelTable {
        ClassLabelTable::from_names(["cat", "dog"])
    }

    #[test]
    fn full_frame_box_covers_whole_image() {
        for (w, h) in [(1, 1), (640, 480), (1920, 1080), (37, 911)] {
            let dets = [det(0.0, 0.0, w as f32, h as f32, 0.5, 0)];
            let result =
                detections_to_task_result(w, h, &dets, &cat_dog(), &FieldBinding::default())
                    .unwrap();
            let rec = &result.annotations[0];
            assert_eq!(rec.x_pct, 0.0);
            assert_eq!(rec.y_pct, 0.0);
            assert_eq!(rec.width_pct, 100.0);
            assert_eq!(rec.height_pct, 100.0);
        }
    }

    #[test]
    fn empty_detections_score_zero() {
        let result =
            detections_to_task_result(10, 10, &[], &cat_dog(), &FieldBinding::default()).unwrap();
        assert!(result.annotations.is_empty());
        assert_eq!(result.aggregate_score, 0.0);
        assert_eq!(result, TaskResult::empty());
    }

    #[test]
    fn unknown_class_gets_synthesized_label() {
        let dets = [det(0.0, 0.0, 5.0, 5.0, 0.4, 7)];
        let result =
            detections_to_task_result(10, 10, &dets, &cat_dog(), &FieldBinding::default()).unwrap();
        assert_eq!(result.annotations[0].labels, vec!["unknown_class_7"]);
    }

    #[test]
    fn preserves_input_order() {
        let dets = [
            det(0.0, 0.0, 1.0, 1.0, 0.2, 1),
            det(2.0, 2.0, 3.0, 3.0, 0.9, 0),
            det(4.0, 4.0, 5.0, 5.0, 0.5, 1),
        ];
        let result =
            detections_to_task_result(10, 10, &dets, &cat_dog(), &FieldBinding::default()).unwrap();
        let xs: Vec<f64> = result.annotations.iter().map(|a| a.x_pct).collect();
        let labels: Vec<&str> = result.annotations.iter().map(|a| a.labels[0].as_str()).collect();
        assert_eq!(xs, vec![0.0, 20.0, 40.0]);
        assert_eq!(labels, vec!["dog", "cat", "dog"]);
    }

    #[test]
    fn converts_reference_example() {
        let fields = FieldBinding::new("label", "image").unwrap();
        let dets = [det(20.0, 10.0, 120.0, 60.0, 0.87, 0)];
        let result = detections_to_task_result(200, 100, &dets, &cat_dog(), &fields).unwrap();

        let rec = &result.annotations[0];
        assert_eq!(rec.shape_type, ShapeType::Rectangle);
        assert_eq!(rec.from_field, "label");
        assert_eq!(rec.to_field, "image");
        assert_eq!(rec.labels, vec!["cat"]);
        assert_eq!(rec.x_pct, 10.0);
        assert_eq!(rec.y_pct, 10.0);
        assert_eq!(rec.width_pct, 50.0);
        assert_eq!(rec.height_pct, 50.0);
        assert_eq!(rec.score, 0.87);
        assert_eq!(result.aggregate_score, 0.87);
    }

    #[test]
    fn aggregate_is_mean_of_scores() {
        let dets = [det(0.0, 0.0, 1.0, 1.0, 0.25, 0), det(0.0, 0.0, 1.0, 1.0, 0.75, 1)];
        let result =
            detections_to_task_result(4, 4, &dets, &cat_dog(), &FieldBinding::default()).unwrap();
        assert_eq!(result.aggregate_score, 0.5);
    }

    #[test]
    fn zero_dimension_is_a_precondition_error() {
        let dets = [det(0.0, 0.0, 1.0, 1.0, 0.5, 0)];
        for (w, h) in [(0, 10), (10, 0), (0, 0)] {
            let err = detections_to_task_result(w, h, &dets, &cat_dog(), &FieldBinding::default())
                .unwrap_err();
            assert!(matches!(err, DomainError::Precondition(_)));
        }
    }

    #[test]
    fn out_of_bounds_boxes_are_not_clamped() {
        let dets = [det(-10.0, 50.0, 110.0, 150.0, 0.5, 0)];
        let result =
            detections_to_task_result(100, 100, &dets, &cat_dog(), &FieldBinding::default())
                .unwrap();
        let rec = &result.annotations[0];
        assert_eq!(rec.x_pct, -10.0);
        assert_eq!(rec.width_pct, 120.0);
        assert_eq!(rec.y_pct + rec.height_pct, 150.0);
    }

    #[test]
    fn field_binding_requires_names() {
        assert!(FieldBinding::new("", "image").is_err());
        assert!(FieldBinding::new("label", "  ").is_err());
        assert_eq!(FieldBinding::new("label", "image").unwrap(), FieldBinding::default());
    }
}
