//! Middleware de autenticación JWT
//!
//! Este módulo maneja la extracción y verificación del bearer token y
//! la verificación de roles.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use serde::Serialize;

use crate::{
    models::user::UserRole,
    state::AppState,
    utils::errors::AppError,
    utils::jwt::{extract_token_from_header, verify_token},
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)
        .map_err(|_| AppError::Unauthorized("Token inválido o expirado".to_string()))?;

    let authenticated_user = AuthenticatedUser {
        user_id: claims.sub,
        username: claims.username,
        role: claims.role,
    };

    // Inyectar usuario autenticado en las extensions
    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}

/// Middleware para verificar permisos de admin
pub async fn admin_only_middleware(
    Extension(user): Extension<AuthenticatedUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden(
            "Se requieren permisos de administrador".to_string(),
        ));
    }

    Ok(next.run(request).await)
}
