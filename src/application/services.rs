use std::sync::Arc;
use tracing::debug;

use crate::{
    application::ports::{DetectorPort, ImageLoaderPort},
    domain::{
        detection::{summarize_detections, DetectionResult},
        errors::DomainResult,
        image::ImageReference,
    },
};

/// Caso de uso de detección: carga la imagen, la pasa por el modelo y
/// traduce cada detección cruda al formato servido por la API.
#[derive(Clone)]
pub struct DetectionService {
    loader: Arc<dyn ImageLoaderPort>,
    detector: Arc<dyn DetectorPort>,
}

impl DetectionService {
    pub fn new(loader: Arc<dyn ImageLoaderPort>, detector: Arc<dyn DetectorPort>) -> Self {
        Self { loader, detector }
    }

    /// Detecta objetos en la imagen indicada por `reference`.
    /// El orden es el que entrega el modelo; una lista vacía no es un error.
    pub async fn detect(&self, reference: &str) -> DomainResult<Vec<DetectionResult>> {
        let reference = ImageReference::parse(reference)?;
        let image = self.loader.load(&reference).await?;
        let (w, h) = image.dimensions();

        let raw = self.detector.detect(image).await?;

        let results: Vec<DetectionResult> = raw
            .iter()
            .map(|det| {
                let label = self
                    .detector
                    .class_label(det.class_id)
                    .unwrap_or_else(|| format!("class_{}", det.class_id));
                DetectionResult::from_raw(det, label)
            })
            .collect();

        debug!(
            image = %reference.describe(),
            width = w,
            height = h,
            count = results.len(),
            "detections: [{}]",
            summarize_detections(&results)
        );

        Ok(results)
    }
}
