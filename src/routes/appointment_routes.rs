use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use crate::dto::appointment_dto::{
    AppointmentFilters, CompleteAppointmentRequest, CreateAppointmentRequest,
    RescheduleAppointmentRequest, UpdateAppointmentRequest,
};
use crate::dto::common_dto::{ApiResponse, CancelRequest};
use crate::models::appointment::Appointment;
use crate::services::appointment_service::AppointmentService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_appointment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route(
            "/:id",
            get(get_appointment)
                .patch(update_appointment)
                .delete(delete_appointment),
        )
        .route("/:id/complete", patch(complete_appointment))
        .route("/:id/cancel", patch(cancel_appointment))
        .route("/:id/reschedule", patch(reschedule_appointment))
}

async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = AppointmentService::new(state.pool.clone()).create(request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn list_appointments(
    State(state): State<AppState>,
    Query(filters): Query<AppointmentFilters>,
) -> Result<Json<Paginated<Appointment>>, AppError> {
    let appointments = AppointmentService::new(state.pool.clone()).list(filters).await?;
    Ok(Json(appointments))
}

async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = AppointmentService::new(state.pool.clone()).get(id).await?;
    Ok(Json(appointment))
}

async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = AppointmentService::new(state.pool.clone())
        .update(id, request)
        .await?;
    Ok(Json(appointment))
}

async fn complete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Option<Json<CompleteAppointmentRequest>>,
) -> Result<Json<Appointment>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let appointment = AppointmentService::new(state.pool.clone())
        .complete(id, request)
        .await?;
    Ok(Json(appointment))
}

async fn cancel_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    request: Option<Json<CancelRequest>>,
) -> Result<Json<Appointment>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let appointment = AppointmentService::new(state.pool.clone())
        .cancel(id, request)
        .await?;
    Ok(Json(appointment))
}

async fn reschedule_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = AppointmentService::new(state.pool.clone())
        .reschedule(id, request)
        .await?;
    Ok(Json(appointment))
}

async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    AppointmentService::new(state.pool.clone()).delete(id).await?;
    Ok(Json(ApiResponse::message("Cita eliminada exitosamente".to_string())))
}
