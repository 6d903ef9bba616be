use std::path::Path;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::ModelId;

/// Checks that a model reference points at a readable ONNX file before the
/// session is built.
pub fn validate_model(model: &ModelId) -> DomainResult<()> {
    if model.onnx_path.trim().is_empty() {
        return Err(DomainError::InvalidInput("onnx_path empty".into()));
    }
    let path = Path::new(&model.onnx_path);
    if !path.is_file() {
        return Err(DomainError::NotFound(format!("model file not found: {}", model.onnx_path)));
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some("onnx") {
        return Err(DomainError::InvalidInput(format!(
            "{} is not an .onnx file; export the weights with format=onnx",
            model.onnx_path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(path: &str) -> ModelId {
        ModelId { version: "v".into(), onnx_path: path.into() }
    }

    #[test]
    fn rejects_empty_and_missing_paths() {
        assert!(matches!(validate_model(&model(" ")), Err(DomainError::InvalidInput(_))));
        assert!(matches!(validate_model(&model("/nope/best.onnx")), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn requires_onnx_extension() {
        let pt = tempfile::Builder::new().suffix(".pt").tempfile().unwrap();
        let err = validate_model(&model(pt.path().to_str().unwrap())).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let onnx = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
        assert!(validate_model(&model(onnx.path().to_str().unwrap())).is_ok());
    }
}
