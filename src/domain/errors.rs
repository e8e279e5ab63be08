use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid image reference: {0}")]
    InvalidReference(String),
    #[error("image not found: {0}")]
    ImageNotFound(String),
    #[error("could not decode image: {0}")]
    ImageDecode(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("detector unavailable")]
    DetectorUnavailable,
}

impl DomainError {
    /// Verdadero cuando el fallo lo causó lo que envió el cliente.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidReference(_) | Self::ImageNotFound(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
