use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::vaccination_dto::{
    AddVaccinationRecordRequest, CreateVaccinationPlanRequest, UpdateVaccinationPlanRequest,
    VaccinationPlanDetail, VaccinationPlanFilters, VaccinationRecordWithVaccine,
};
use crate::models::vaccination::{VaccinationPlan, VaccinationRecord};
use crate::services::vaccination_plan_service::VaccinationPlanService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_vaccination_plan_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/:id", get(get_plan).patch(update_plan).delete(delete_plan))
        .route("/:id/activate", patch(activate_plan))
        .route("/:id/deactivate", patch(deactivate_plan))
        .route("/:id/records", get(list_records).post(add_record))
}

fn service(state: &AppState) -> VaccinationPlanService {
    VaccinationPlanService::new(state.pool.clone(), state.config.vaccination_policy.clone())
}

/// Inscribe la mascota y programa todas las vacunas de la plantilla
async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<CreateVaccinationPlanRequest>,
) -> Result<(StatusCode, Json<VaccinationPlanDetail>), AppError> {
    let plan = service(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn list_plans(
    State(state): State<AppState>,
    Query(filters): Query<VaccinationPlanFilters>,
) -> Result<Json<Paginated<VaccinationPlan>>, AppError> {
    let plans = service(&state).list(filters).await?;
    Ok(Json(plans))
}

async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VaccinationPlanDetail>, AppError> {
    let plan = service(&state).detail(id).await?;
    Ok(Json(plan))
}

async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateVaccinationPlanRequest>,
) -> Result<Json<VaccinationPlan>, AppError> {
    let plan = service(&state).update(id, request).await?;
    Ok(Json(plan))
}

async fn activate_plan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VaccinationPlan>, AppError> {
    let plan = service(&state).set_active(id, true).await?;
    Ok(Json(plan))
}

async fn deactivate_plan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VaccinationPlan>, AppError> {
    let plan = service(&state).set_active(id, false).await?;
    Ok(Json(plan))
}

async fn list_records(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<VaccinationRecordWithVaccine>>, AppError> {
    let records = service(&state).records(id).await?;
    Ok(Json(records))
}

async fn add_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AddVaccinationRecordRequest>,
) -> Result<(StatusCode, Json<VaccinationRecord>), AppError> {
    let record = service(&state).add_record(id, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    service(&state).delete(id).await?;
    Ok(Json(ApiResponse::message(
        "Plan de vacunación eliminado exitosamente".to_string(),
    )))
}
