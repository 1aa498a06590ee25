use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::dto::common_dto::CancelRequest;
use crate::dto::vaccination_dto::{
    ApplyVaccinationRequest, RescheduleVaccinationRequest, VaccinationRecordFilters,
};
use crate::models::notification::{NewNotification, NotificationKind};
use crate::models::vaccination::{VaccinationPlanStatus, VaccinationRecord};
use crate::repositories::notification_repository::NotificationRepository;
use crate::repositories::pet_repository::PetRepository;
use crate::repositories::vaccination_plan_repository::VaccinationPlanRepository;
use crate::repositories::vaccination_record_repository::VaccinationRecordRepository;
use crate::services::person_service::PersonService;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/vaccination-records";

/// Marca el plan como completado si ya no le quedan dosis pendientes y al
/// menos una fue aplicada. Devuelve el id de la mascota del plan.
async fn close_plan_if_finished(conn: &mut PgConnection, plan_id: i32) -> AppResult<i32> {
    let mut plan = VaccinationPlanRepository::lock(&mut *conn, plan_id)
        .await?
        .ok_or_else(|| not_found_error("Plan de vacunación", plan_id))?;

    let tally = VaccinationRecordRepository::tally(&mut *conn, plan_id).await?;
    if tally.plan_finished() && plan.status != VaccinationPlanStatus::Completado {
        plan.status = VaccinationPlanStatus::Completado;
        VaccinationPlanRepository::save(conn, &plan).await?;
        log::info!("🎉 Plan de vacunación {} completado", plan_id);
    }
    Ok(plan.pet_id)
}

pub struct VaccinationRecordService {
    pool: PgPool,
    repository: VaccinationRecordRepository,
    persons: PersonService,
}

impl VaccinationRecordService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VaccinationRecordRepository::new(pool.clone()),
            persons: PersonService::new(pool.clone()),
            pool,
        }
    }

    pub async fn get(&self, id: i32) -> AppResult<VaccinationRecord> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Registro de vacunación", id))
    }

    pub async fn list(&self, filters: VaccinationRecordFilters) -> AppResult<Paginated<VaccinationRecord>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (records, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(records, total, page, LIST_PATH))
    }

    /// Registra la aplicación de una dosis y avisa al dueño de la mascota.
    pub async fn apply(&self, id: i32, request: ApplyVaccinationRequest) -> AppResult<VaccinationRecord> {
        request.validate()?;
        if let Some(administered_by) = request.administered_by {
            self.persons.require_staff(administered_by).await?;
        }

        let mut tx = self.pool.begin().await?;
        let mut record = VaccinationRecordRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Registro de vacunación", id))?;

        record.apply(Utc::now(), request.into())?;
        let record = VaccinationRecordRepository::save(&mut tx, &record).await?;
        let pet_id = close_plan_if_finished(&mut tx, record.vaccination_plan_id).await?;

        let pet = PetRepository::lock(&mut tx, pet_id)
            .await?
            .ok_or_else(|| not_found_error("Mascota", pet_id))?;
        NotificationRepository::insert(
            &mut tx,
            &NewNotification {
                person_id: pet.owner_id,
                title: "Vacuna aplicada".to_string(),
                message: format!(
                    "Se registró una vacuna aplicada a {} el {}",
                    pet.name,
                    record
                        .administered_date
                        .unwrap_or_else(Utc::now)
                        .format("%Y-%m-%d")
                ),
                kind: NotificationKind::Vacuna,
            },
        )
        .await?;
        tx.commit().await?;

        log::info!("💉 Registro de vacunación {} aplicado", id);
        Ok(record)
    }

    pub async fn cancel(&self, id: i32, request: CancelRequest) -> AppResult<VaccinationRecord> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut record = VaccinationRecordRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Registro de vacunación", id))?;

        record.cancel(Utc::now(), request.reason.as_deref())?;
        let record = VaccinationRecordRepository::save(&mut tx, &record).await?;
        close_plan_if_finished(&mut tx, record.vaccination_plan_id).await?;
        tx.commit().await?;

        log::info!("🚫 Registro de vacunación {} cancelado", id);
        Ok(record)
    }

    pub async fn reschedule(
        &self,
        id: i32,
        request: RescheduleVaccinationRequest,
    ) -> AppResult<VaccinationRecord> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut record = VaccinationRecordRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Registro de vacunación", id))?;

        record.reschedule(Utc::now(), request.scheduled_date)?;
        let record = VaccinationRecordRepository::save(&mut tx, &record).await?;
        tx.commit().await?;

        log::info!("📆 Registro de vacunación {} reprogramado para {}", id, record.scheduled_date);
        Ok(record)
    }

    pub async fn toggle_enabled(&self, id: i32) -> AppResult<VaccinationRecord> {
        let mut tx = self.pool.begin().await?;
        let mut record = VaccinationRecordRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Registro de vacunación", id))?;

        record.toggle_enabled(Utc::now())?;
        let record = VaccinationRecordRepository::save(&mut tx, &record).await?;
        tx.commit().await?;

        log::info!(
            "🔀 Registro de vacunación {} {}",
            id,
            if record.enabled { "habilitado" } else { "deshabilitado" }
        );
        Ok(record)
    }
}
