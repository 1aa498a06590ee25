use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::services::auth_service::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// `/login` es pública; `/profile` requiere token
pub fn create_auth_router(state: AppState) -> Router<AppState> {
    Router::new().route("/login", post(login)).route(
        "/profile",
        get(profile).route_layer(middleware::from_fn_with_state(state, auth_middleware)),
    )
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let service = AuthService::new(state.pool.clone(), state.jwt.clone());
    let response = service.login(request).await?;
    Ok(Json(response))
}

async fn profile(Extension(user): Extension<AuthenticatedUser>) -> Json<AuthenticatedUser> {
    Json(user)
}
