use std::sync::Arc;
use crate::application::services::PredictionService;

/// Shared state for the axum handlers: the prediction use case, built once
/// at startup with the loaded model.
#[derive(Clone)]
pub struct HttpState {
    pub prediction: Arc<PredictionService>,
}
