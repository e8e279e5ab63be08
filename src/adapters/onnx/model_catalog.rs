use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::ModelCatalogPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::ModelId;

pub struct OnnxModelCatalog;

impl OnnxModelCatalog {
    pub fn new() -> Self { Self }
}

impl Default for OnnxModelCatalog {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl ModelCatalogPort for OnnxModelCatalog {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
        if model.onnx_path.trim().is_empty() {
            return Err(DomainError::InvalidModel("onnx_path empty".into()));
        }
        let path = Path::new(&model.onnx_path);
        if !path.is_file() {
            return Err(DomainError::ModelNotFound(model.onnx_path.clone()));
        }
        if path.extension().and_then(|e| e.to_str()) != Some("onnx") {
            return Err(DomainError::InvalidModel(format!("not an .onnx file: {}", model.onnx_path)));
        }
        Ok(())
    }
}
