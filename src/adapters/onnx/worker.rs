use anyhow::Result;
use async_trait::async_trait;
use image::RgbImage;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use crate::adapters::onnx::labels::LabelTable;
use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::DetectorPort;
use crate::domain::{
    detection::RawDetection,
    errors::{DomainError, DomainResult},
};

/// Cualquier cosa capaz de ejecutar el modelo sobre un frame. Pide `&mut self`
/// porque una sesión de ORT lo exige.
pub trait FrameDetector: Send + 'static {
    fn infer(&mut self, image: &RgbImage) -> Result<Vec<RawDetection>>;
}

impl FrameDetector for OnnxYoloEngine {
    fn infer(&mut self, image: &RgbImage) -> Result<Vec<RawDetection>> {
        OnnxYoloEngine::infer(self, image)
    }
}

struct Job {
    image: RgbImage,
    reply: oneshot::Sender<DomainResult<Vec<RawDetection>>>,
}

/// Dueño único del modelo: un hilo dedicado recibe imágenes por un canal
/// y responde a cada petición por su propio oneshot.
pub struct InferenceWorker {
    tx: mpsc::UnboundedSender<Job>,
    labels: Arc<LabelTable>,
}

impl InferenceWorker {
    pub fn spawn<E: FrameDetector>(engine: E, labels: LabelTable) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("inference-worker".into())
            .spawn(move || run(engine, rx))?;

        Ok(Self { tx, labels: Arc::new(labels) })
    }
}

fn run<E: FrameDetector>(mut engine: E, mut rx: mpsc::UnboundedReceiver<Job>) {
    info!("Inference worker: hilo de inferencia iniciado.");
    let mut crashed = false;

    while let Some(job) = rx.blocking_recv() {
        let t0 = std::time::Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| engine.infer(&job.image)));
        tracing::trace!(infer_ms = t0.elapsed().as_secs_f32() * 1000.0, "frame processed");

        let result = match outcome {
            Ok(Ok(detections)) => Ok(detections),
            Ok(Err(e)) => {
                error!("Error en inferencia: {:?}", e);
                Err(DomainError::Inference(e.to_string()))
            }
            Err(payload) => {
                // Tras un panic el estado del motor no es fiable: se responde y se sale.
                let reason = panic_message(payload.as_ref());
                error!("❌ Inference worker: el motor hizo panic: {}", reason);
                let _ = job.reply.send(Err(DomainError::Inference(format!("engine panicked: {}", reason))));
                crashed = true;
                break;
            }
        };

        // El cliente pudo haberse ido; no es un error del worker.
        let _ = job.reply.send(result);
    }

    if crashed {
        error!("Inference worker: terminado de forma anómala, el detector queda sin servicio.");
    } else {
        info!("Inference worker: canal cerrado, saliendo.");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl DetectorPort for InferenceWorker {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<RawDetection>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job { image, reply })
            .map_err(|_| DomainError::DetectorUnavailable)?;
        rx.await.map_err(|_| DomainError::DetectorUnavailable)?
    }

    fn class_label(&self, class_id: usize) -> Option<String> {
        self.labels.get(class_id).map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct CountingEngine {
        calls: usize,
    }

    impl FrameDetector for CountingEngine {
        fn infer(&mut self, image: &RgbImage) -> Result<Vec<RawDetection>> {
            self.calls += 1;
            if image.width() == 0 {
                return Err(anyhow!("empty frame"));
            }
            if image.width() == 13 {
                panic!("engine crashed");
            }
            Ok(vec![RawDetection {
                class_id: 16,
                confidence: self.calls as f32 / 10.0,
                left: 0.0,
                top: 0.0,
                right: image.width() as f32,
                bottom: image.height() as f32,
            }])
        }
    }

    fn worker() -> InferenceWorker {
        InferenceWorker::spawn(CountingEngine { calls: 0 }, LabelTable::coco()).unwrap()
    }

    #[tokio::test]
    async fn serves_requests_one_at_a_time() {
        let w = worker();
        let a = w.detect(RgbImage::new(4, 3)).await.unwrap();
        let b = w.detect(RgbImage::new(4, 3)).await.unwrap();
        assert_eq!(a[0].confidence, 0.1);
        assert_eq!(b[0].confidence, 0.2);
        assert_eq!((a[0].right, a[0].bottom), (4.0, 3.0));
        assert_eq!(w.class_label(16).as_deref(), Some("dog"));
        assert_eq!(w.class_label(1000), None);
    }

    #[tokio::test]
    async fn concurrent_callers_all_get_answers() {
        let w = Arc::new(worker());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let w = w.clone();
                tokio::spawn(async move { w.detect(RgbImage::new(2, 2)).await })
            })
            .collect();
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn engine_errors_become_inference_errors() {
        let w = worker();
        let err = w.detect(RgbImage::new(0, 0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Inference(_)));
        // el worker sigue atendiendo
        assert!(w.detect(RgbImage::new(1, 1)).await.is_ok());
    }

    #[tokio::test]
    async fn engine_panic_is_reported_then_worker_is_unavailable() {
        let w = worker();
        let err = w.detect(RgbImage::new(13, 1)).await.unwrap_err();
        match err {
            DomainError::Inference(msg) => assert!(msg.contains("engine crashed"), "{}", msg),
            other => panic!("expected inference error, got {:?}", other),
        }
        let err = w.detect(RgbImage::new(1, 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::DetectorUnavailable));
    }
}
