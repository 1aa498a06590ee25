use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::dto::common_dto::ApiResponse;
use crate::dto::person_dto::{CreatePersonRequest, PersonFilters, UpdatePersonRequest};
use crate::models::person::Person;
use crate::services::person_service::PersonService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::Paginated;

pub fn create_person_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_persons).post(create_person))
        .route("/:id", get(get_person).patch(update_person).delete(delete_person))
}

async fn create_person(
    State(state): State<AppState>,
    Json(request): Json<CreatePersonRequest>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = PersonService::new(state.pool.clone()).create(request).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

async fn list_persons(
    State(state): State<AppState>,
    Query(filters): Query<PersonFilters>,
) -> Result<Json<Paginated<Person>>, AppError> {
    let persons = PersonService::new(state.pool.clone()).list(filters).await?;
    Ok(Json(persons))
}

async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Person>, AppError> {
    let person = PersonService::new(state.pool.clone()).get(id).await?;
    Ok(Json(person))
}

async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdatePersonRequest>,
) -> Result<Json<Person>, AppError> {
    let person = PersonService::new(state.pool.clone()).update(id, request).await?;
    Ok(Json(person))
}

async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    PersonService::new(state.pool.clone()).delete(id).await?;
    Ok(Json(ApiResponse::message("Persona eliminada exitosamente".to_string())))
}
