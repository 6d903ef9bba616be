use crate::domain::{
    annotation::FieldBinding,
    labels::ClassLabelTable,
    model::{ModelId, YoloParams},
};

/// Everything fixed at model-load time. Built once in `main` and shared
/// read-only by the service and the HTTP layer.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub model: ModelId,
    pub params: YoloParams,
    pub labels: ClassLabelTable,
    pub fields: FieldBinding,
}
