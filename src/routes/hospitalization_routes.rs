use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::hospitalization_dto::{
    CreateHospitalizationRequest, DischargeRequest, HospitalizationFilters,
    UpdateHospitalizationRequest,
};
use crate::models::hospitalization::Hospitalization;
use crate::services::hospitalization_service::HospitalizationService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_hospitalization_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_hospitalizations).post(create_hospitalization))
        .route(
            "/:id",
            get(get_hospitalization)
                .patch(update_hospitalization)
                .delete(delete_hospitalization),
        )
        .route("/:id/discharge", patch(discharge))
}

async fn create_hospitalization(
    State(state): State<AppState>,
    Json(request): Json<CreateHospitalizationRequest>,
) -> Result<(StatusCode, Json<Hospitalization>), AppError> {
    let hospitalization = HospitalizationService::new(state.pool.clone())
        .create(request)
        .await?;
    Ok((StatusCode::CREATED, Json(hospitalization)))
}

async fn list_hospitalizations(
    State(state): State<AppState>,
    Query(filters): Query<HospitalizationFilters>,
) -> Result<Json<Paginated<Hospitalization>>, AppError> {
    let hospitalizations = HospitalizationService::new(state.pool.clone())
        .list(filters)
        .await?;
    Ok(Json(hospitalizations))
}

async fn get_hospitalization(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Hospitalization>, AppError> {
    let hospitalization = HospitalizationService::new(state.pool.clone()).get(id).await?;
    Ok(Json(hospitalization))
}

async fn update_hospitalization(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateHospitalizationRequest>,
) -> Result<Json<Hospitalization>, AppError> {
    let hospitalization = HospitalizationService::new(state.pool.clone())
        .update(id, request)
        .await?;
    Ok(Json(hospitalization))
}

async fn discharge(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Option<Json<DischargeRequest>>,
) -> Result<Json<Hospitalization>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let hospitalization = HospitalizationService::new(state.pool.clone())
        .discharge(id, request)
        .await?;
    Ok(Json(hospitalization))
}

async fn delete_hospitalization(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    HospitalizationService::new(state.pool.clone()).delete(id).await?;
    Ok(Json(ApiResponse::message(
        "Hospitalización eliminada exitosamente".to_string(),
    )))
}
