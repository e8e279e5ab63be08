use async_trait::async_trait;
use base64::{prelude::BASE64_STANDARD, Engine};
use image::RgbImage;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::application::ports::ImageLoaderPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::image::ImageReference;

/// Carga imágenes del sistema de ficheros local o de payloads base64 en línea.
pub struct FsImageLoader {
    root: Option<PathBuf>,
}

impl FsImageLoader {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    async fn read_bytes(&self, reference: &ImageReference) -> DomainResult<Vec<u8>> {
        match reference {
            ImageReference::Path(path) => {
                let full = self.resolve(path);
                tokio::fs::read(&full).await.map_err(|e| match e.kind() {
                    ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                        DomainError::ImageNotFound(full.display().to_string())
                    }
                    // Un directorio u otro fallo de lectura es culpa del servidor
                    _ => DomainError::ImageDecode(format!("{}: {}", full.display(), e)),
                })
            }
            ImageReference::Base64(data) => {
                // Los clientes a veces parten las líneas del base64
                let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                BASE64_STANDARD
                    .decode(compact.as_bytes())
                    .map_err(|e| DomainError::InvalidReference(format!("bad base64 payload: {}", e)))
            }
        }
    }
}

pub fn decode_rgb(bytes: &[u8]) -> DomainResult<RgbImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(|e| DomainError::ImageDecode(e.to_string()))
}

#[async_trait]
impl ImageLoaderPort for FsImageLoader {
    async fn load(&self, reference: &ImageReference) -> DomainResult<RgbImage> {
        let bytes = self.read_bytes(reference).await?;
        tokio::task::spawn_blocking(move || decode_rgb(&bytes))
            .await
            .map_err(|e| DomainError::ImageDecode(format!("decoder task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([200, 10, 10]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn loads_relative_path_against_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dog.png"), png_bytes(8, 6)).unwrap();

        let loader = FsImageLoader::new(Some(dir.path().to_path_buf()));
        let img = loader.load(&ImageReference::Path("dog.png".into())).await.unwrap();
        assert_eq!(img.dimensions(), (8, 6));
        assert_eq!(img.get_pixel(0, 0), &Rgb([200, 10, 10]));
    }

    #[tokio::test]
    async fn absolute_path_ignores_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, png_bytes(4, 4)).unwrap();

        let loader = FsImageLoader::new(Some(PathBuf::from("/does/not/matter")));
        let img = loader.load(&ImageReference::Path(path)).await.unwrap();
        assert_eq!(img.dimensions(), (4, 4));
    }

    #[tokio::test]
    async fn loads_base64_payload() {
        let encoded = BASE64_STANDARD.encode(png_bytes(3, 2));
        let loader = FsImageLoader::new(None);
        let img = loader.load(&ImageReference::Base64(encoded)).await.unwrap();
        assert_eq!(img.dimensions(), (3, 2));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let loader = FsImageLoader::new(None);
        let err = loader
            .load(&ImageReference::Path("/no/such/file.jpg".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ImageNotFound(_)));
    }

    #[tokio::test]
    async fn garbage_bytes_fail_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("junk.jpg"), b"definitely not a jpeg").unwrap();

        let loader = FsImageLoader::new(Some(dir.path().to_path_buf()));
        let err = loader.load(&ImageReference::Path("junk.jpg".into())).await.unwrap_err();
        assert!(matches!(err, DomainError::ImageDecode(_)));
    }

    #[tokio::test]
    async fn bad_base64_is_a_client_error() {
        let loader = FsImageLoader::new(None);
        let err = loader
            .load(&ImageReference::Base64("***".into()))
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }
}
