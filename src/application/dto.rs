use serde::{Deserialize, Serialize};

/// Cuerpo de `POST /detect`. `image` es opcional aquí para que una clave
/// ausente se reporte como nuestro propio 400 y no como rechazo del deserializador.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub image: Option<String>,
}

impl DetectRequest {
    pub fn image_reference(&self) -> Option<&str> {
        self.image.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
