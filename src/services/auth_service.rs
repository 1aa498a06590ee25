use sqlx::PgPool;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, LoginUser};
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::jwt::{generate_token, JwtConfig};

/// Servicio de autenticación
pub struct AuthService {
    users: UserRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;
        log::info!("🔐 Autenticando usuario: {}", request.username);

        // Mismo mensaje para usuario inexistente y contraseña incorrecta
        let invalid = || AppError::Unauthorized("Usuario o contraseña incorrectos".to_string());

        let row = self
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or_else(invalid)?;

        let matches = bcrypt::verify(&request.password, &row.user.password_hash)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        if !matches {
            log::warn!("⚠️ Contraseña incorrecta para: {}", request.username);
            return Err(invalid());
        }

        if !row.user.is_active {
            log::warn!("⚠️ Usuario inactivo: {}", request.username);
            return Err(AppError::Unauthorized("El usuario está inactivo".to_string()));
        }

        let access_token = generate_token(row.user.id, &row.user.username, row.user.role, &self.jwt)?;
        log::info!("✅ Autenticación exitosa para: {}", request.username);

        Ok(LoginResponse {
            access_token,
            user: LoginUser::from(&row),
        })
    }
}
