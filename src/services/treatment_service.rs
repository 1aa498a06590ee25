use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::dto::common_dto::CancelRequest;
use crate::dto::treatment_dto::{CreateTreatmentRequest, TreatmentFilters, UpdateTreatmentRequest};
use crate::models::treatment::Treatment;
use crate::repositories::medical_record_repository::MedicalRecordRepository;
use crate::repositories::treatment_repository::TreatmentRepository;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};
use crate::utils::validation::ensure_date_order;

const LIST_PATH: &str = "/api/treatments";

pub struct TreatmentService {
    pool: PgPool,
    repository: TreatmentRepository,
    medical_records: MedicalRecordRepository,
}

impl TreatmentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: TreatmentRepository::new(pool.clone()),
            medical_records: MedicalRecordRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, request: CreateTreatmentRequest) -> AppResult<Treatment> {
        request.validate()?;
        ensure_date_order(request.start_date, request.end_date, "el tratamiento")?;
        self.medical_records
            .find_by_id(request.medical_record_id)
            .await?
            .ok_or_else(|| not_found_error("Historia clínica", request.medical_record_id))?;

        let treatment = self.repository.create(request).await?;
        log::info!("💊 Tratamiento {} iniciado: {}", treatment.id, treatment.name);
        Ok(treatment)
    }

    pub async fn get(&self, id: i32) -> AppResult<Treatment> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Tratamiento", id))
    }

    pub async fn list(&self, filters: TreatmentFilters) -> AppResult<Paginated<Treatment>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (treatments, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(treatments, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdateTreatmentRequest) -> AppResult<Treatment> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut treatment = TreatmentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Tratamiento", id))?;

        request.merge_into(&mut treatment);
        treatment.validate()?;
        let treatment = TreatmentRepository::save(&mut tx, &treatment).await?;
        tx.commit().await?;
        Ok(treatment)
    }

    pub async fn complete(&self, id: i32) -> AppResult<Treatment> {
        let mut tx = self.pool.begin().await?;
        let mut treatment = TreatmentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Tratamiento", id))?;

        treatment.complete(Utc::now())?;
        let treatment = TreatmentRepository::save(&mut tx, &treatment).await?;
        tx.commit().await?;
        log::info!("✅ Tratamiento {} completado", id);
        Ok(treatment)
    }

    pub async fn cancel(&self, id: i32, request: CancelRequest) -> AppResult<Treatment> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut treatment = TreatmentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Tratamiento", id))?;

        treatment.cancel(Utc::now(), request.reason.as_deref())?;
        let treatment = TreatmentRepository::save(&mut tx, &treatment).await?;
        tx.commit().await?;
        log::info!("🚫 Tratamiento {} cancelado", id);
        Ok(treatment)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Tratamiento", id));
        }
        Ok(())
    }
}
