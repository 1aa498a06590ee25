use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::surgical_consent_dto::{
    CreateSurgicalConsentRequest, SurgicalConsentFilters, UpdateSurgicalConsentRequest,
};
use crate::models::surgical_consent::SurgicalConsent;
use crate::services::surgical_consent_service::SurgicalConsentService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;
use crate::utils::uploads::upload_body_limit;

pub fn create_surgical_consent_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(list_consents).post(create_consent))
        .route(
            "/:id",
            get(get_consent).patch(update_consent).delete(delete_consent),
        )
        .route(
            "/:id/document",
            post(attach_document).layer(upload_body_limit(max_upload_bytes)),
        )
        .route("/:id/reject", patch(reject_consent))
}

async fn create_consent(
    State(state): State<AppState>,
    Json(request): Json<CreateSurgicalConsentRequest>,
) -> Result<(StatusCode, Json<SurgicalConsent>), AppError> {
    let consent = SurgicalConsentService::new(state.pool.clone())
        .create(request)
        .await?;
    Ok((StatusCode::CREATED, Json(consent)))
}

async fn list_consents(
    State(state): State<AppState>,
    Query(filters): Query<SurgicalConsentFilters>,
) -> Result<Json<Paginated<SurgicalConsent>>, AppError> {
    let consents = SurgicalConsentService::new(state.pool.clone())
        .list(filters)
        .await?;
    Ok(Json(consents))
}

async fn get_consent(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SurgicalConsent>, AppError> {
    let consent = SurgicalConsentService::new(state.pool.clone()).get(id).await?;
    Ok(Json(consent))
}

async fn update_consent(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateSurgicalConsentRequest>,
) -> Result<Json<SurgicalConsent>, AppError> {
    let consent = SurgicalConsentService::new(state.pool.clone())
        .update(id, request)
        .await?;
    Ok(Json(consent))
}

/// Recibe el PDF firmado en el campo `file`
async fn attach_document(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<SurgicalConsent>, AppError> {
    let consent = SurgicalConsentService::new(state.pool.clone())
        .attach_document(id, &mut multipart, &state.config)
        .await?;
    Ok(Json(consent))
}

async fn reject_consent(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SurgicalConsent>, AppError> {
    let consent = SurgicalConsentService::new(state.pool.clone()).reject(id).await?;
    Ok(Json(consent))
}

async fn delete_consent(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    SurgicalConsentService::new(state.pool.clone())
        .delete(id, &state.config)
        .await?;
    Ok(Json(ApiResponse::message(
        "Consentimiento eliminado exitosamente".to_string(),
    )))
}
