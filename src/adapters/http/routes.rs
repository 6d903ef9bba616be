use axum::{extract::{rejection::JsonRejection, State}, response::IntoResponse, Json};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::adapters::http::{error::ApiError, state::HttpState};
use crate::application::dto::{HealthResponse, PredictResponse, StatusResponse};

pub async fn index(State(st): State<HttpState>) -> impl IntoResponse {
    let settings = st.prediction.settings();
    Json(json!({
        "name": "YOLO ML Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "model_loaded": true,
        "model_version": settings.model.version,
        "classes": settings.labels.names(),
        "endpoints": {
            "/health": "GET - liveness",
            "/setup": "GET/POST - model configuration",
            "/predict": "POST - run prediction on tasks",
            "/webhook": "POST - platform event callback"
        }
    }))
}

pub async fn health() -> impl IntoResponse {
    // The process refuses to start without a model, so a live process has one.
    Json(HealthResponse { status: "UP".into(), model_loaded: true })
}

pub async fn setup(State(st): State<HttpState>) -> impl IntoResponse {
    let setup = st.prediction.setup();
    info!(model_version = %setup.model_version, labels = setup.labels.len(), "setup requested");
    Json(setup)
}

pub async fn predict(
    State(st): State<HttpState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let tasks = match body.get("tasks") {
        Some(Value::Array(tasks)) => tasks.clone(),
        Some(_) => return Err(ApiError::BadRequest("'tasks' must be an array".into())),
        None => return Err(ApiError::BadRequest("Missing 'tasks' in request".into())),
    };

    info!(tasks = tasks.len(), "predict request");
    let results = st.prediction.predict(tasks).await;
    Ok(Json(PredictResponse { results }))
}

pub async fn webhook(body: Result<Json<Value>, JsonRejection>) -> Result<Json<StatusResponse>, ApiError> {
    let Json(event) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let action = event.get("action").and_then(Value::as_str).unwrap_or("unknown");
    info!(%action, "webhook received");
    debug!(payload = %event, "webhook payload");
    Ok(Json(StatusResponse { status: "ok".into() }))
}
