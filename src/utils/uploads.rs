//! Archivos subidos
//!
//! Guarda imágenes de mascotas y consentimientos firmados en el directorio
//! configurado y devuelve la URL relativa bajo `/uploads`.

use std::path::{Path, PathBuf};

use axum::extract::{DefaultBodyLimit, Multipart};
use tracing::{info, warn};
use uuid::Uuid;

use crate::utils::errors::AppError;

pub const URL_PREFIX: &str = "/uploads";
pub const PET_IMAGES_DIR: &str = "pets";
/// Servido solo con token, a diferencia de las imágenes.
pub const CONSENT_DOCUMENTS_DIR: &str = "consents";

/// Margen para cabeceras y separadores del formulario multipart.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Tipos MIME aceptados y su extensión en disco
pub const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

pub const PDF_TYPES: &[(&str, &str)] = &[("application/pdf", "pdf")];

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub size: usize,
}

/// Límite de cuerpo para las rutas que reciben archivos de hasta `max_bytes`.
pub fn upload_body_limit(max_bytes: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_bytes.saturating_add(MULTIPART_OVERHEAD))
}

fn extension_for(content_type: &str, allowed: &[(&'static str, &'static str)]) -> Option<&'static str> {
    allowed
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// Lee el campo `file` del formulario y lo guarda en `<upload_dir>/<subdir>/`.
pub async fn store_upload(
    multipart: &mut Multipart,
    upload_dir: &str,
    subdir: &str,
    allowed: &[(&'static str, &'static str)],
    max_bytes: usize,
) -> Result<StoredFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Formulario multipart inválido: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let extension = extension_for(&content_type, allowed).ok_or_else(|| {
            AppError::BadRequest(format!("Tipo de archivo no permitido: '{}'", content_type))
        })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Error leyendo el archivo: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("El archivo está vacío".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(AppError::BadRequest(format!(
                "El archivo excede el tamaño máximo de {} bytes",
                max_bytes
            )));
        }

        let dir = Path::new(upload_dir).join(subdir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("No se pudo crear {}: {}", dir.display(), e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("No se pudo guardar {}: {}", path.display(), e)))?;

        info!("📁 Archivo guardado: {} ({} bytes)", path.display(), bytes.len());

        return Ok(StoredFile {
            url: public_url(subdir, &file_name),
            size: bytes.len(),
        });
    }

    Err(AppError::BadRequest("Falta el campo 'file' en el formulario".to_string()))
}

pub fn public_url(subdir: &str, file_name: &str) -> String {
    format!("{}/{}/{}", URL_PREFIX, subdir, file_name)
}

/// Ruta en disco de una URL pública; `None` si no pertenece a `/uploads`.
pub fn path_for_url(upload_dir: &str, url: &str) -> Option<PathBuf> {
    let relative = url.strip_prefix(URL_PREFIX)?.trim_start_matches('/');
    if relative.is_empty() || relative.split('/').any(|part| part == "..") {
        return None;
    }
    Some(Path::new(upload_dir).join(relative))
}

/// Borra el archivo de una URL pública. Un fallo solo se registra.
pub async fn remove_upload(upload_dir: &str, url: &str) {
    if let Some(path) = path_for_url(upload_dir, url) {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("No se pudo borrar {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "limite-de-prueba";
    const TEST_MAX_BYTES: usize = 4 * 1024 * 1024;

    fn upload_app(upload_dir: String) -> Router {
        Router::new().route(
            "/upload",
            post(move |mut multipart: Multipart| {
                let upload_dir = upload_dir.clone();
                async move {
                    let stored = store_upload(
                        &mut multipart,
                        &upload_dir,
                        PET_IMAGES_DIR,
                        IMAGE_TYPES,
                        TEST_MAX_BYTES,
                    )
                    .await?;
                    Ok::<_, AppError>(Json(json!({ "url": stored.url, "size": stored.size })))
                }
            })
            .layer(upload_body_limit(TEST_MAX_BYTES)),
        )
    }

    fn multipart_request(content_type: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::with_capacity(payload.len() + 256);
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"foto\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::post("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn scratch_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("veterinaria-uploads-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_upload_above_axum_default_limit_is_stored() {
        let dir = scratch_dir();
        let payload = vec![0u8; 3 * 1024 * 1024];

        let response = upload_app(dir.display().to_string())
            .oneshot(multipart_request("image/png", &payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["size"], payload.len());
        let url = body["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/pets/"));
        assert!(path_for_url(&dir.display().to_string(), url).unwrap().exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_upload_over_configured_maximum_is_rejected() {
        let dir = scratch_dir();
        let payload = vec![0u8; TEST_MAX_BYTES + 1];

        let response = upload_app(dir.display().to_string())
            .oneshot(multipart_request("image/png", &payload))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("tamaño máximo"));
        assert!(!dir.join(PET_IMAGES_DIR).exists());
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_type() {
        let dir = scratch_dir();

        let response = upload_app(dir.display().to_string())
            .oneshot(multipart_request("application/pdf", b"%PDF-1.4"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/png", IMAGE_TYPES), Some("png"));
        assert_eq!(extension_for("application/pdf", PDF_TYPES), Some("pdf"));
        assert_eq!(extension_for("application/pdf", IMAGE_TYPES), None);
        assert_eq!(extension_for("", IMAGE_TYPES), None);
    }

    #[test]
    fn test_public_url_and_back() {
        let url = public_url("pets", "abc.png");
        assert_eq!(url, "/uploads/pets/abc.png");
        assert_eq!(
            path_for_url("/var/data", &url),
            Some(PathBuf::from("/var/data/pets/abc.png"))
        );
    }

    #[test]
    fn test_path_for_url_rejects_traversal() {
        assert_eq!(path_for_url("/var/data", "/uploads/../etc/passwd"), None);
        assert_eq!(path_for_url("/var/data", "/static/a.png"), None);
    }
}
