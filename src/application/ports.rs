use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{detection::RawDetection, errors::DomainResult, image::ImageReference, model::ModelId};

#[async_trait]
pub trait ImageLoaderPort: Send + Sync {
    async fn load(&self, reference: &ImageReference) -> DomainResult<RgbImage>;
}

/// Modelo de detección ya cargado. El umbral de confianza se fija al cargar
/// el modelo; `detect` solo devuelve detecciones iguales o superiores a él.
#[async_trait]
pub trait DetectorPort: Send + Sync {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<RawDetection>>;
    fn class_label(&self, class_id: usize) -> Option<String>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}
