use std::sync::Arc;
use crate::application::services::DetectionService;

/// Estado compartido para los manejadores HTTP de Axum.
/// Contiene el caso de uso de detección, que a su vez guarda el modelo cargado.
#[derive(Clone)]
pub struct HttpState {
    pub detection: Arc<DetectionService>,
}
