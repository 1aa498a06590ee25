use serde::{Deserialize, Serialize};
use validator::Validate;

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl ApiResponse<()> {
    /// Respuesta sin datos, p. ej. tras un borrado
    pub fn message(message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: None,
        }
    }
}

// Request para cancelar (citas, tratamientos, vacunas)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}
