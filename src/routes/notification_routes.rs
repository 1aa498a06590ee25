use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::notification_dto::{
    CreateNotificationRequest, NotificationFilters, UpdateNotificationRequest,
};
use crate::models::notification::Notification;
use crate::services::notification_service::NotificationService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_notification_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications).post(create_notification))
        .route(
            "/:id",
            get(get_notification)
                .patch(update_notification)
                .delete(delete_notification),
        )
        .route("/:id/read", patch(mark_read))
}

async fn create_notification(
    State(state): State<AppState>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let notification = NotificationService::new(state.pool.clone())
        .create(request)
        .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

async fn list_notifications(
    State(state): State<AppState>,
    Query(filters): Query<NotificationFilters>,
) -> Result<Json<Paginated<Notification>>, AppError> {
    let notifications = NotificationService::new(state.pool.clone())
        .list(filters)
        .await?;
    Ok(Json(notifications))
}

async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Notification>, AppError> {
    let notification = NotificationService::new(state.pool.clone()).get(id).await?;
    Ok(Json(notification))
}

async fn update_notification(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateNotificationRequest>,
) -> Result<Json<Notification>, AppError> {
    let notification = NotificationService::new(state.pool.clone())
        .update(id, request)
        .await?;
    Ok(Json(notification))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Notification>, AppError> {
    let notification = NotificationService::new(state.pool.clone()).mark_read(id).await?;
    Ok(Json(notification))
}

async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    NotificationService::new(state.pool.clone()).delete(id).await?;
    Ok(Json(ApiResponse::message(
        "Notificación eliminada exitosamente".to_string(),
    )))
}
