mod adapters;
mod application;
mod config;
mod domain;

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::adapters::{
    http::{router, state::HttpState},
    images::loader::ImageLoader,
    onnx::{detector::OnnxDetector, model_catalog::validate_model, yolo_engine::OnnxYoloEngine},
};
use crate::application::{services::PredictionService, settings::BackendSettings};
use crate::config::Config;
use crate::domain::labels::ClassLabelTable;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging (RUST_LOG=info by default)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::parse();

    // 2. Model and labels. Any failure here stops the process.
    let model = cfg.model_id();
    let params = cfg.yolo_params()?;
    let fields = cfg.field_binding()?;
    validate_model(&model)?;

    tracing::info!(path = %model.onnx_path, "loading model");
    let engine = OnnxYoloEngine::load(&model.onnx_path)?;

    // An explicit labels file wins over the names embedded in the model.
    let labels = match &cfg.labels {
        Some(path) => ClassLabelTable::load(path)?,
        None => match engine.class_names()? {
            Some(names) => ClassLabelTable::from_model_names(&names)?,
            None => ClassLabelTable::default(),
        },
    };
    if labels.is_empty() {
        tracing::warn!("label table is empty; classes will be reported as unknown_class_<id>");
    }
    tracing::info!(
        count = labels.len(),
        classes = ?labels.names(),
        conf = params.conf_threshold,
        "model ready"
    );

    // 3. Adapters and service
    let detector = Arc::new(OnnxDetector::new(engine, params.clone()));
    let images = Arc::new(ImageLoader::new(cfg.fetch_timeout())?);
    let settings = Arc::new(BackendSettings { model, params, labels, fields });
    let prediction = Arc::new(PredictionService::new(detector, images, settings));

    // 4. Serve
    let app = router(HttpState { prediction });
    let addr = cfg.bind_addr();
    tracing::info!("ML backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
