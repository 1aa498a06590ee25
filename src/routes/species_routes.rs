use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::species_dto::{CreateSpeciesRequest, SpeciesFilters, UpdateSpeciesRequest};
use crate::models::species::Species;
use crate::services::species_service::SpeciesService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_species_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_species).post(create_species))
        .route("/:id", get(get_species).patch(update_species).delete(delete_species))
}

async fn create_species(
    State(state): State<AppState>,
    Json(request): Json<CreateSpeciesRequest>,
) -> Result<(StatusCode, Json<Species>), AppError> {
    let species = SpeciesService::new(state.pool.clone()).create(request).await?;
    Ok((StatusCode::CREATED, Json(species)))
}

async fn list_species(
    State(state): State<AppState>,
    Query(filters): Query<SpeciesFilters>,
) -> Result<Json<Paginated<Species>>, AppError> {
    let species = SpeciesService::new(state.pool.clone()).list(filters).await?;
    Ok(Json(species))
}

async fn get_species(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Species>, AppError> {
    let species = SpeciesService::new(state.pool.clone()).get(id).await?;
    Ok(Json(species))
}

async fn update_species(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateSpeciesRequest>,
) -> Result<Json<Species>, AppError> {
    let species = SpeciesService::new(state.pool.clone()).update(id, request).await?;
    Ok(Json(species))
}

async fn delete_species(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    SpeciesService::new(state.pool.clone()).delete(id).await?;
    Ok(Json(ApiResponse::message("Especie eliminada exitosamente".to_string())))
}
