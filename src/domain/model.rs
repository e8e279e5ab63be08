use serde::{Deserialize, Serialize};

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,       // nombre de la arquitectura, p.ej. "yolo11n"
    pub onnx_path: String,  // ruta en disco
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoloParams {
    pub input_size: u32,        // 640 habitual
    pub conf_threshold: f32,    // 0..1
    pub iou_threshold: f32,     // 0..1
    pub max_detections: usize,  // p.ej. 300
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: 0.45,
            max_detections: 100,
        }
    }
}

/// Todo lo necesario para cargar el detector una vez al arrancar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub model: ModelId,
    pub params: YoloParams,
    pub labels_path: Option<String>,
}
