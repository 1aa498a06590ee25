use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};

use crate::dto::common_dto::CancelRequest;
use crate::dto::vaccination_dto::{
    ApplyVaccinationRequest, RescheduleVaccinationRequest, VaccinationRecordFilters,
};
use crate::models::vaccination::VaccinationRecord;
use crate::services::vaccination_record_service::VaccinationRecordService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_vaccination_record_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_records))
        .route("/:id", get(get_record))
        .route("/:id/apply", patch(apply_record))
        .route("/:id/cancel", patch(cancel_record))
        .route("/:id/reschedule", patch(reschedule_record))
        .route("/:id/toggle-enabled", patch(toggle_enabled))
}

async fn list_records(
    State(state): State<AppState>,
    Query(filters): Query<VaccinationRecordFilters>,
) -> Result<Json<Paginated<VaccinationRecord>>, AppError> {
    let records = VaccinationRecordService::new(state.pool.clone())
        .list(filters)
        .await?;
    Ok(Json(records))
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VaccinationRecord>, AppError> {
    let record = VaccinationRecordService::new(state.pool.clone()).get(id).await?;
    Ok(Json(record))
}

async fn apply_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Option<Json<ApplyVaccinationRequest>>,
) -> Result<Json<VaccinationRecord>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let record = VaccinationRecordService::new(state.pool.clone())
        .apply(id, request)
        .await?;
    Ok(Json(record))
}

async fn cancel_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Option<Json<CancelRequest>>,
) -> Result<Json<VaccinationRecord>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let record = VaccinationRecordService::new(state.pool.clone())
        .cancel(id, request)
        .await?;
    Ok(Json(record))
}

async fn reschedule_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<RescheduleVaccinationRequest>,
) -> Result<Json<VaccinationRecord>, AppError> {
    let record = VaccinationRecordService::new(state.pool.clone())
        .reschedule(id, request)
        .await?;
    Ok(Json(record))
}

async fn toggle_enabled(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VaccinationRecord>, AppError> {
    let record = VaccinationRecordService::new(state.pool.clone())
        .toggle_enabled(id)
        .await?;
    Ok(Json(record))
}
