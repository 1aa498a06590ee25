use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::medical_record_dto::{
    CreateMedicalRecordRequest, MedicalRecordFilters, UpdateMedicalRecordRequest,
};
use crate::models::medical_record::MedicalRecord;
use crate::services::medical_record_service::MedicalRecordService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_medical_record_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route("/:id", get(get_record).patch(update_record).delete(delete_record))
}

async fn create_record(
    State(state): State<AppState>,
    Json(request): Json<CreateMedicalRecordRequest>,
) -> Result<(StatusCode, Json<MedicalRecord>), AppError> {
    let record = MedicalRecordService::new(state.pool.clone()).create(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_records(
    State(state): State<AppState>,
    Query(filters): Query<MedicalRecordFilters>,
) -> Result<Json<Paginated<MedicalRecord>>, AppError> {
    let records = MedicalRecordService::new(state.pool.clone()).list(filters).await?;
    Ok(Json(records))
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MedicalRecord>, AppError> {
    let record = MedicalRecordService::new(state.pool.clone()).get(id).await?;
    Ok(Json(record))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateMedicalRecordRequest>,
) -> Result<Json<MedicalRecord>, AppError> {
    let record = MedicalRecordService::new(state.pool.clone())
        .update(id, request)
        .await?;
    Ok(Json(record))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    MedicalRecordService::new(state.pool.clone()).delete(id).await?;
    Ok(Json(ApiResponse::message(
        "Historia clínica eliminada exitosamente".to_string(),
    )))
}
