use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::dto::hospitalization_dto::{
    CreateHospitalizationRequest, DischargeRequest, HospitalizationFilters,
    UpdateHospitalizationRequest,
};
use crate::models::hospitalization::Hospitalization;
use crate::repositories::hospitalization_repository::{
    HospitalizationRepository, NewHospitalization, ALREADY_HOSPITALIZED,
};
use crate::services::person_service::PersonService;
use crate::services::pet_service::PetService;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/hospitalizations";

pub struct HospitalizationService {
    pool: PgPool,
    repository: HospitalizationRepository,
    pets: PetService,
    persons: PersonService,
}

impl HospitalizationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: HospitalizationRepository::new(pool.clone()),
            pets: PetService::new(pool.clone()),
            persons: PersonService::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, request: CreateHospitalizationRequest) -> AppResult<Hospitalization> {
        request.validate()?;
        self.pets.get(request.pet_id).await?;
        self.persons.require_staff(request.veterinarian_id).await?;

        if self.repository.active_for_pet(request.pet_id).await?.is_some() {
            log::warn!("⚠️ La mascota {} ya está hospitalizada", request.pet_id);
            return Err(AppError::Conflict(ALREADY_HOSPITALIZED.to_string()));
        }

        let hospitalization = self
            .repository
            .create(NewHospitalization {
                pet_id: request.pet_id,
                veterinarian_id: request.veterinarian_id,
                admission_date: request.admission_date.unwrap_or_else(Utc::now),
                reason: request.reason.trim().to_string(),
                diagnosis: request.diagnosis,
                notes: request.notes,
            })
            .await?;

        log::info!(
            "🏥 Mascota {} hospitalizada ({})",
            hospitalization.pet_id,
            hospitalization.id
        );
        Ok(hospitalization)
    }

    pub async fn get(&self, id: i32) -> AppResult<Hospitalization> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Hospitalización", id))
    }

    pub async fn list(&self, filters: HospitalizationFilters) -> AppResult<Paginated<Hospitalization>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (rows, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(rows, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdateHospitalizationRequest) -> AppResult<Hospitalization> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut hospitalization = HospitalizationRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Hospitalización", id))?;

        request.merge_into(&mut hospitalization);
        hospitalization.validate()?;
        let hospitalization = HospitalizationRepository::save(&mut tx, &hospitalization).await?;
        tx.commit().await?;
        Ok(hospitalization)
    }

    pub async fn discharge(&self, id: i32, request: DischargeRequest) -> AppResult<Hospitalization> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut hospitalization = HospitalizationRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Hospitalización", id))?;

        hospitalization.discharge(Utc::now(), request.discharge_date, request.notes.as_deref())?;
        let hospitalization = HospitalizationRepository::save(&mut tx, &hospitalization).await?;
        tx.commit().await?;

        log::info!("🏠 Alta de la hospitalización {}", id);
        Ok(hospitalization)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Hospitalización", id));
        }
        Ok(())
    }
}
