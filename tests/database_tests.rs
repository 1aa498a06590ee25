//! Pruebas contra PostgreSQL real.
//!
//! Se omiten si `TEST_DATABASE_URL` no está definida. Cada prueba crea sus
//! propias filas con nombres únicos, así que pueden correr en paralelo sobre
//! la misma base.

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use veterinaria_backend::config::VaccinationSchedulePolicy;
use veterinaria_backend::database::connection::run_migrations;
use veterinaria_backend::dto::common_dto::CancelRequest;
use veterinaria_backend::dto::hospitalization_dto::{
    CreateHospitalizationRequest, DischargeRequest,
};
use veterinaria_backend::dto::vaccination_dto::CreateVaccinationPlanRequest;
use veterinaria_backend::models::hospitalization::HospitalizationStatus;
use veterinaria_backend::services::hospitalization_service::HospitalizationService;
use veterinaria_backend::services::notification_service::NotificationService;
use veterinaria_backend::services::treatment_service::TreatmentService;
use veterinaria_backend::services::vaccination_plan_service::VaccinationPlanService;
use veterinaria_backend::utils::errors::AppError;

async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL no definida, se omite la prueba");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("conexión a la base de pruebas");
    run_migrations(&pool).await.expect("migraciones");
    Some(pool)
}

struct Fixture {
    species_id: i32,
    other_species_id: i32,
    owner_id: i32,
    veterinarian_id: i32,
    pet_id: i32,
}

fn unique_tag() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_string()
}

async fn insert_species(pool: &PgPool) -> i32 {
    sqlx::query_scalar("INSERT INTO species (name) VALUES ($1) RETURNING id")
        .bind(format!("Especie {}", unique_tag()))
        .fetch_one(pool)
        .await
        .expect("especie")
}

async fn insert_person(pool: &PgPool, role: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO persons (first_name, last_name, document, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Ana")
    .bind("Prueba")
    .bind(unique_tag())
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("persona")
}

async fn fixture(pool: &PgPool) -> Fixture {
    let species_id = insert_species(pool).await;
    let other_species_id = insert_species(pool).await;
    let owner_id = insert_person(pool, "cliente").await;
    let veterinarian_id = insert_person(pool, "staff").await;

    let pet_id = sqlx::query_scalar(
        "INSERT INTO pets (name, species_id, sex, age, owner_id) VALUES ('Luna', $1, 'hembra', 3, $2) RETURNING id",
    )
    .bind(species_id)
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .expect("mascota");

    Fixture {
        species_id,
        other_species_id,
        owner_id,
        veterinarian_id,
        pet_id,
    }
}

/// Plantilla con una vacuna obligatoria por cada edad dada.
async fn insert_template(pool: &PgPool, species_id: i32, ages: &[i32]) -> i32 {
    let template_id: i32 = sqlx::query_scalar(
        "INSERT INTO species_vaccination_plans (species_id, name, recommended_age) VALUES ($1, $2, 2) RETURNING id",
    )
    .bind(species_id)
    .bind(format!("Plan {}", unique_tag()))
    .fetch_one(pool)
    .await
    .expect("plantilla");

    for age in ages {
        sqlx::query(
            "INSERT INTO vaccines (species_vaccination_plan_id, name, application_age, validity, is_mandatory) VALUES ($1, $2, $3, 12, TRUE)",
        )
        .bind(template_id)
        .bind(format!("Vacuna {} meses", age))
        .bind(age)
        .execute(pool)
        .await
        .expect("vacuna");
    }
    template_id
}

async fn count(pool: &PgPool, sql: &str, id: i32) -> i64 {
    sqlx::query_scalar(sql)
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("conteo")
}

fn enrollment(pet_id: i32, template_id: i32) -> CreateVaccinationPlanRequest {
    CreateVaccinationPlanRequest {
        pet_id,
        species_vaccination_plan_id: template_id,
        status: None,
        notes: None,
    }
}

fn vaccination_service(pool: &PgPool) -> VaccinationPlanService {
    VaccinationPlanService::new(pool.clone(), VaccinationSchedulePolicy::default())
}

#[tokio::test]
async fn test_enrollment_creates_one_pending_record_per_vaccine() {
    let Some(pool) = test_pool().await else { return };
    let fx = fixture(&pool).await;
    let template_id = insert_template(&pool, fx.species_id, &[2, 4, 6]).await;

    let detail = vaccination_service(&pool)
        .create(enrollment(fx.pet_id, template_id))
        .await
        .unwrap();

    assert_eq!(detail.records.len(), 3);
    assert_eq!(detail.pet.owner.id, fx.owner_id);
    let pending = count(
        &pool,
        "SELECT COUNT(*) FROM vaccination_records WHERE vaccination_plan_id = $1 AND status = 'pendiente'",
        detail.id,
    )
    .await;
    assert_eq!(pending, 3);
}

#[tokio::test]
async fn test_enrollment_in_other_species_template_persists_nothing() {
    let Some(pool) = test_pool().await else { return };
    let fx = fixture(&pool).await;
    let template_id = insert_template(&pool, fx.other_species_id, &[2, 4]).await;

    let result = vaccination_service(&pool)
        .create(enrollment(fx.pet_id, template_id))
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    let plans = count(&pool, "SELECT COUNT(*) FROM vaccination_plans WHERE pet_id = $1", fx.pet_id).await;
    assert_eq!(plans, 0);
    let records = count(
        &pool,
        "SELECT COUNT(*) FROM vaccination_records r JOIN vaccination_plans p ON p.id = r.vaccination_plan_id WHERE p.pet_id = $1",
        fx.pet_id,
    )
    .await;
    assert_eq!(records, 0);
}

#[tokio::test]
async fn test_concurrent_enrollment_creates_a_single_plan() {
    let Some(pool) = test_pool().await else { return };
    let fx = fixture(&pool).await;
    let template_id = insert_template(&pool, fx.species_id, &[2, 4]).await;
    let service = vaccination_service(&pool);

    let (first, second) = tokio::join!(
        service.create(enrollment(fx.pet_id, template_id)),
        service.create(enrollment(fx.pet_id, template_id)),
    );

    let conflicts = [&first, &second]
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict(_))))
        .count();
    assert_eq!(conflicts, 1);
    assert!(first.is_ok() || second.is_ok());

    let plans = count(&pool, "SELECT COUNT(*) FROM vaccination_plans WHERE pet_id = $1", fx.pet_id).await;
    assert_eq!(plans, 1);
}

#[tokio::test]
async fn test_concurrent_discharge_succeeds_once() {
    let Some(pool) = test_pool().await else { return };
    let fx = fixture(&pool).await;
    let service = HospitalizationService::new(pool.clone());

    let hospitalization = service
        .create(CreateHospitalizationRequest {
            pet_id: fx.pet_id,
            veterinarian_id: fx.veterinarian_id,
            admission_date: Some(Utc::now() - Duration::hours(6)),
            reason: "Observación postoperatoria".to_string(),
            diagnosis: None,
            notes: None,
        })
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        service.discharge(
            hospitalization.id,
            DischargeRequest {
                discharge_date: None,
                notes: Some("Alta desde recepción".to_string()),
            },
        ),
        service.discharge(
            hospitalization.id,
            DischargeRequest {
                discharge_date: None,
                notes: Some("Alta desde consultorio".to_string()),
            },
        ),
    );

    assert_eq!([&first, &second].iter().filter(|r| r.is_ok()).count(), 1);
    assert!(matches!(
        if first.is_ok() { second } else { first },
        Err(AppError::BadRequest(_))
    ));

    let stored = service.get(hospitalization.id).await.unwrap();
    assert_eq!(stored.status, HospitalizationStatus::Alta);
    let notes = stored.notes.unwrap_or_default();
    assert_eq!(notes.matches("Alta desde").count(), 1);
}

#[tokio::test]
async fn test_concurrent_complete_and_cancel_of_treatment() {
    let Some(pool) = test_pool().await else { return };
    let fx = fixture(&pool).await;

    let record_id: i32 = sqlx::query_scalar(
        "INSERT INTO medical_records (pet_id, veterinarian_id, visit_date, reason) VALUES ($1, $2, NOW(), 'Control') RETURNING id",
    )
    .bind(fx.pet_id)
    .bind(fx.veterinarian_id)
    .fetch_one(&pool)
    .await
    .expect("historia clínica");
    let treatment_id: i32 = sqlx::query_scalar(
        "INSERT INTO treatments (medical_record_id, name, start_date) VALUES ($1, 'Amoxicilina', CURRENT_DATE) RETURNING id",
    )
    .bind(record_id)
    .fetch_one(&pool)
    .await
    .expect("tratamiento");

    let service = TreatmentService::new(pool.clone());
    let (completed, cancelled) = tokio::join!(
        service.complete(treatment_id),
        service.cancel(
            treatment_id,
            CancelRequest {
                reason: Some("Reacción alérgica".to_string()),
            },
        ),
    );

    assert_eq!([completed.is_ok(), cancelled.is_ok()].iter().filter(|ok| **ok).count(), 1);

    let stored = service.get(treatment_id).await.unwrap();
    let expected = match (&completed, &cancelled) {
        (Ok(treatment), _) | (_, Ok(treatment)) => treatment.status,
        _ => unreachable!(),
    };
    assert_eq!(stored.status, expected);
}

#[tokio::test]
async fn test_concurrent_mark_read_succeeds_once() {
    let Some(pool) = test_pool().await else { return };
    let fx = fixture(&pool).await;

    let notification_id: i32 = sqlx::query_scalar(
        "INSERT INTO notifications (person_id, title, message) VALUES ($1, 'Recordatorio', 'Vacuna pendiente') RETURNING id",
    )
    .bind(fx.owner_id)
    .fetch_one(&pool)
    .await
    .expect("notificación");

    let service = NotificationService::new(pool.clone());
    let (first, second) = tokio::join!(
        service.mark_read(notification_id),
        service.mark_read(notification_id),
    );

    assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert!(service.get(notification_id).await.unwrap().is_read);
}
