use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::user_dto::{CreateUserRequest, UpdateUserRequest, UserFilters, UserResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::services::user_service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

/// Gestión de usuarios (solo administradores)
pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = UserService::new(state.pool.clone()).create(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilters>,
) -> Result<Json<Paginated<UserResponse>>, AppError> {
    let users = UserService::new(state.pool.clone()).list(filters).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::new(state.pool.clone()).get(id).await?;
    Ok(Json(user))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::new(state.pool.clone()).update(id, request).await?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    UserService::new(state.pool.clone()).delete(id, current.user_id).await?;
    Ok(Json(ApiResponse::message("Usuario eliminado exitosamente".to_string())))
}
