use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use crate::dto::common_dto::{ApiResponse, CancelRequest};
use crate::dto::treatment_dto::{CreateTreatmentRequest, TreatmentFilters, UpdateTreatmentRequest};
use crate::models::treatment::Treatment;
use crate::services::treatment_service::TreatmentService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_treatment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_treatments).post(create_treatment))
        .route(
            "/:id",
            get(get_treatment).patch(update_treatment).delete(delete_treatment),
        )
        .route("/:id/complete", patch(complete_treatment))
        .route("/:id/cancel", patch(cancel_treatment))
}

async fn create_treatment(
    State(state): State<AppState>,
    Json(request): Json<CreateTreatmentRequest>,
) -> Result<(StatusCode, Json<Treatment>), AppError> {
    let treatment = TreatmentService::new(state.pool.clone()).create(request).await?;
    Ok((StatusCode::CREATED, Json(treatment)))
}

async fn list_treatments(
    State(state): State<AppState>,
    Query(filters): Query<TreatmentFilters>,
) -> Result<Json<Paginated<Treatment>>, AppError> {
    let treatments = TreatmentService::new(state.pool.clone()).list(filters).await?;
    Ok(Json(treatments))
}

async fn get_treatment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Treatment>, AppError> {
    let treatment = TreatmentService::new(state.pool.clone()).get(id).await?;
    Ok(Json(treatment))
}

async fn update_treatment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateTreatmentRequest>,
) -> Result<Json<Treatment>, AppError> {
    let treatment = TreatmentService::new(state.pool.clone())
        .update(id, request)
        .await?;
    Ok(Json(treatment))
}

async fn complete_treatment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Treatment>, AppError> {
    let treatment = TreatmentService::new(state.pool.clone()).complete(id).await?;
    Ok(Json(treatment))
}

async fn cancel_treatment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Option<Json<CancelRequest>>,
) -> Result<Json<Treatment>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let treatment = TreatmentService::new(state.pool.clone())
        .cancel(id, request)
        .await?;
    Ok(Json(treatment))
}

async fn delete_treatment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    TreatmentService::new(state.pool.clone()).delete(id).await?;
    Ok(Json(ApiResponse::message("Tratamiento eliminado exitosamente".to_string())))
}
