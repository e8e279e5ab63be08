use std::path::PathBuf;
use thiserror::Error;

use crate::adapters::http::DEFAULT_BODY_LIMIT;
use crate::domain::model::{InferenceConfig, ModelId, YoloParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?}")]
    Parse { var: &'static str, value: String },
    #[error("{var}: {reason}")]
    OutOfRange { var: &'static str, reason: String },
}

/// Configuración del servidor, leída una sola vez al arrancar.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub inference: InferenceConfig,
    pub image_root: Option<PathBuf>,
    pub body_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            inference: InferenceConfig {
                model: ModelId {
                    name: "yolo11n".into(),
                    onnx_path: "models/yolo11n.onnx".into(),
                },
                params: YoloParams::default(),
                labels_path: None,
            },
            image_root: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la configuración desde cualquier fuente clave/valor; las claves
    /// ausentes conservan su valor por defecto.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DETECTOR_HOST") {
            cfg.host = v;
        }
        if let Some(v) = get("DETECTOR_PORT") {
            cfg.port = parse("DETECTOR_PORT", &v)?;
        }
        if let Some(v) = get("DETECTOR_MODEL_PATH") {
            cfg.inference.model.onnx_path = v;
        }
        if let Some(v) = get("DETECTOR_ARCH") {
            cfg.inference.model.name = v;
        }
        if let Some(v) = get("DETECTOR_LABELS_PATH") {
            cfg.inference.labels_path = Some(v);
        }
        if let Some(v) = get("DETECTOR_IMAGE_ROOT") {
            cfg.image_root = Some(PathBuf::from(v));
        }

        let params = &mut cfg.inference.params;
        if let Some(v) = get("DETECTOR_THRESHOLD") {
            params.conf_threshold = unit_interval("DETECTOR_THRESHOLD", parse("DETECTOR_THRESHOLD", &v)?)?;
        }
        if let Some(v) = get("DETECTOR_IOU") {
            params.iou_threshold = unit_interval("DETECTOR_IOU", parse("DETECTOR_IOU", &v)?)?;
        }
        if let Some(v) = get("DETECTOR_INPUT_SIZE") {
            params.input_size = positive("DETECTOR_INPUT_SIZE", parse("DETECTOR_INPUT_SIZE", &v)?)?;
        }
        if let Some(v) = get("DETECTOR_MAX_DETECTIONS") {
            params.max_detections = positive("DETECTOR_MAX_DETECTIONS", parse("DETECTOR_MAX_DETECTIONS", &v)?)?;
        }
        if let Some(v) = get("DETECTOR_BODY_LIMIT") {
            cfg.body_limit = positive("DETECTOR_BODY_LIMIT", parse("DETECTOR_BODY_LIMIT", &v)?)?;
        }

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Parse { var, value: value.to_string() })
}

fn unit_interval(var: &'static str, v: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(ConfigError::OutOfRange { var, reason: format!("{} is outside [0, 1]", v) })
    }
}

fn positive<T: PartialOrd + Default + std::fmt::Display>(var: &'static str, v: T) -> Result<T, ConfigError> {
    if v > T::default() {
        Ok(v)
    } else {
        Err(ConfigError::OutOfRange { var, reason: format!("{} must be > 0", v) })
    }
}
