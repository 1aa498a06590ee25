use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch},
    Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::pet_dto::{CreatePetRequest, PetDetailResponse, PetFilters, UpdatePetRequest};
use crate::models::pet::{Pet, PetImage};
use crate::services::pet_service::PetService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;
use crate::utils::uploads::upload_body_limit;

pub fn create_pet_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list_pets).post(create_pet))
        .route("/:id", get(get_pet).patch(update_pet).delete(delete_pet))
        .route(
            "/:id/images",
            get(list_images)
                .post(upload_image)
                .layer(upload_body_limit(max_upload_bytes)),
        )
}

/// Rutas sobre imágenes individuales (`/pet-images`)
pub fn create_pet_image_router() -> Router<AppState> {
    Router::new()
        .route("/:id", delete(delete_image))
        .route("/:id/set-main", patch(set_main_image))
}

async fn create_pet(
    State(state): State<AppState>,
    Json(request): Json<CreatePetRequest>,
) -> Result<(StatusCode, Json<Pet>), AppError> {
    let pet = PetService::new(state.pool.clone()).create(request).await?;
    Ok((StatusCode::CREATED, Json(pet)))
}

async fn list_pets(
    State(state): State<AppState>,
    Query(filters): Query<PetFilters>,
) -> Result<Json<Paginated<Pet>>, AppError> {
    let pets = PetService::new(state.pool.clone()).list(filters).await?;
    Ok(Json(pets))
}

async fn get_pet(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PetDetailResponse>, AppError> {
    let pet = PetService::new(state.pool.clone()).detail(id).await?;
    Ok(Json(pet))
}

async fn update_pet(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdatePetRequest>,
) -> Result<Json<Pet>, AppError> {
    let pet = PetService::new(state.pool.clone()).update(id, request).await?;
    Ok(Json(pet))
}

async fn delete_pet(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    PetService::new(state.pool.clone()).delete(id, &state.config).await?;
    Ok(Json(ApiResponse::message("Mascota eliminada exitosamente".to_string())))
}

async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<PetImage>>, AppError> {
    let images = PetService::new(state.pool.clone()).images(id).await?;
    Ok(Json(images))
}

async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PetImage>), AppError> {
    let image = PetService::new(state.pool.clone())
        .upload_image(id, &mut multipart, &state.config)
        .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

async fn set_main_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PetImage>, AppError> {
    let image = PetService::new(state.pool.clone()).set_main_image(id).await?;
    Ok(Json(image))
}

async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    PetService::new(state.pool.clone())
        .delete_image(id, &state.config)
        .await?;
    Ok(Json(ApiResponse::message("Imagen eliminada exitosamente".to_string())))
}
