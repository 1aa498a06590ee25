use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::vaccination_dto::{
    CreateSpeciesVaccinationPlanRequest, CreateVaccineRequest, SpeciesVaccinationPlanDetail,
    SpeciesVaccinationPlanFilters, UpdateSpeciesVaccinationPlanRequest, UpdateVaccineRequest,
};
use crate::models::vaccination::{SpeciesVaccinationPlan, Vaccine};
use crate::services::species_vaccination_plan_service::SpeciesVaccinationPlanService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

/// Plantillas de vacunación por especie
pub fn create_species_vaccination_plan_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route(
            "/:id",
            get(get_template).patch(update_template).delete(delete_template),
        )
        .route("/:id/vaccines", get(list_vaccines).post(add_vaccine))
}

/// Líneas de vacuna de una plantilla (`/vaccines`)
pub fn create_vaccine_router() -> Router<AppState> {
    Router::new().route(
        "/:id",
        get(get_vaccine).patch(update_vaccine).delete(delete_vaccine),
    )
}

async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<CreateSpeciesVaccinationPlanRequest>,
) -> Result<(StatusCode, Json<SpeciesVaccinationPlan>), AppError> {
    let template = SpeciesVaccinationPlanService::new(state.pool.clone())
        .create(request)
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn list_templates(
    State(state): State<AppState>,
    Query(filters): Query<SpeciesVaccinationPlanFilters>,
) -> Result<Json<Paginated<SpeciesVaccinationPlan>>, AppError> {
    let templates = SpeciesVaccinationPlanService::new(state.pool.clone())
        .list(filters)
        .await?;
    Ok(Json(templates))
}

async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SpeciesVaccinationPlanDetail>, AppError> {
    let template = SpeciesVaccinationPlanService::new(state.pool.clone())
        .detail(id)
        .await?;
    Ok(Json(template))
}

async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateSpeciesVaccinationPlanRequest>,
) -> Result<Json<SpeciesVaccinationPlan>, AppError> {
    let template = SpeciesVaccinationPlanService::new(state.pool.clone())
        .update(id, request)
        .await?;
    Ok(Json(template))
}

async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    SpeciesVaccinationPlanService::new(state.pool.clone())
        .delete(id)
        .await?;
    Ok(Json(ApiResponse::message(
        "Plantilla de vacunación eliminada exitosamente".to_string(),
    )))
}

async fn list_vaccines(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Vaccine>>, AppError> {
    let vaccines = SpeciesVaccinationPlanService::new(state.pool.clone())
        .vaccines(id)
        .await?;
    Ok(Json(vaccines))
}

async fn add_vaccine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<CreateVaccineRequest>,
) -> Result<(StatusCode, Json<Vaccine>), AppError> {
    let vaccine = SpeciesVaccinationPlanService::new(state.pool.clone())
        .add_vaccine(id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(vaccine)))
}

async fn get_vaccine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vaccine>, AppError> {
    let vaccine = SpeciesVaccinationPlanService::new(state.pool.clone())
        .get_vaccine(id)
        .await?;
    Ok(Json(vaccine))
}

async fn update_vaccine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateVaccineRequest>,
) -> Result<Json<Vaccine>, AppError> {
    let vaccine = SpeciesVaccinationPlanService::new(state.pool.clone())
        .update_vaccine(id, request)
        .await?;
    Ok(Json(vaccine))
}

async fn delete_vaccine(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    SpeciesVaccinationPlanService::new(state.pool.clone())
        .delete_vaccine(id)
        .await?;
    Ok(Json(ApiResponse::message("Vacuna eliminada exitosamente".to_string())))
}
