use std::path::PathBuf;

use super::errors::{DomainError, DomainResult};

/// Origen de una imagen, tal como lo envía el cliente.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageReference {
    Path(PathBuf),
    /// Payload base64 aún codificado (sin el prefijo `data:`).
    Base64(String),
}

impl ImageReference {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DomainError::InvalidReference("empty image reference".into()));
        }

        if let Some(rest) = raw.strip_prefix("data:") {
            // data:[<mime>][;base64],<payload>
            let (meta, payload) = rest.split_once(',').ok_or_else(|| {
                DomainError::InvalidReference("data URI without payload".into())
            })?;
            if !meta.ends_with(";base64") {
                return Err(DomainError::InvalidReference(
                    "only base64 data URIs are supported".into(),
                ));
            }
            return Ok(Self::Base64(payload.to_string()));
        }

        if let Some(payload) = raw.strip_prefix("base64:") {
            return Ok(Self::Base64(payload.to_string()));
        }

        if let Some(path) = raw.strip_prefix("file://") {
            if path.is_empty() {
                return Err(DomainError::InvalidReference("file URI without path".into()));
            }
            return Ok(Self::Path(PathBuf::from(path)));
        }

        Ok(Self::Path(PathBuf::from(raw)))
    }

    /// Descripción corta para logs; nunca vuelca un payload base64 entero.
    pub fn describe(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Base64(data) => format!("<base64, {} chars>", data.len()),
        }
    }
}
