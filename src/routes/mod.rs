//! Rutas HTTP
//!
//! Cada módulo expone un `Router<AppState>` que se anida bajo `/api`.
//! Todo, salvo el login, el health check y las imágenes de mascotas, pasa
//! por el middleware de autenticación.

use std::path::Path;

use axum::{middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{admin_only_middleware, auth_middleware, cors_middleware};
use crate::state::AppState;
use crate::utils::uploads::{CONSENT_DOCUMENTS_DIR, PET_IMAGES_DIR, URL_PREFIX};

pub mod appointment_routes;
pub mod auth_routes;
pub mod hospitalization_routes;
pub mod medical_record_routes;
pub mod notification_routes;
pub mod person_routes;
pub mod pet_routes;
pub mod species_routes;
pub mod species_vaccination_plan_routes;
pub mod surgical_consent_routes;
pub mod treatment_routes;
pub mod user_routes;
pub mod vaccination_plan_routes;
pub mod vaccination_record_routes;

/// Construye el router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    let users = user_routes::create_user_router()
        .route_layer(middleware::from_fn(admin_only_middleware));

    let protected = Router::new()
        .nest("/users", users)
        .nest("/persons", person_routes::create_person_router())
        .nest("/species", species_routes::create_species_router())
        .nest("/pets", pet_routes::create_pet_router(max_upload_bytes))
        .nest("/pet-images", pet_routes::create_pet_image_router())
        .nest("/appointments", appointment_routes::create_appointment_router())
        .nest(
            "/hospitalizations",
            hospitalization_routes::create_hospitalization_router(),
        )
        .nest(
            "/medical-records",
            medical_record_routes::create_medical_record_router(),
        )
        .nest("/treatments", treatment_routes::create_treatment_router())
        .nest(
            "/surgical-consents",
            surgical_consent_routes::create_surgical_consent_router(max_upload_bytes),
        )
        .nest("/notifications", notification_routes::create_notification_router())
        .nest(
            "/species-vaccination-plans",
            species_vaccination_plan_routes::create_species_vaccination_plan_router(),
        )
        .nest(
            "/vaccines",
            species_vaccination_plan_routes::create_vaccine_router(),
        )
        .nest(
            "/vaccination-plans",
            vaccination_plan_routes::create_vaccination_plan_router(),
        )
        .nest(
            "/vaccination-records",
            vaccination_record_routes::create_vaccination_record_router(),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let upload_dir = Path::new(&state.config.upload_dir);
    let consent_documents = Router::new()
        .nest_service(
            &format!("{}/{}", URL_PREFIX, CONSENT_DOCUMENTS_DIR),
            ServeDir::new(upload_dir.join(CONSENT_DOCUMENTS_DIR)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .nest("/auth", auth_routes::create_auth_router(state.clone()))
        .merge(protected);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .nest_service(
            &format!("{}/{}", URL_PREFIX, PET_IMAGES_DIR),
            ServeDir::new(upload_dir.join(PET_IMAGES_DIR)),
        )
        .merge(consent_documents)
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware(&state.config.cors_origins))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
