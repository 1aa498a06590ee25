use sqlx::PgPool;
use validator::Validate;

use crate::dto::vaccination_dto::{
    CreateSpeciesVaccinationPlanRequest, CreateVaccineRequest, SpeciesVaccinationPlanDetail,
    SpeciesVaccinationPlanFilters, UpdateSpeciesVaccinationPlanRequest, UpdateVaccineRequest,
};
use crate::models::vaccination::{SpeciesVaccinationPlan, Vaccine};
use crate::repositories::species_vaccination_plan_repository::SpeciesVaccinationPlanRepository;
use crate::services::species_service::SpeciesService;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/species-vaccination-plans";

/// Catálogo de plantillas de vacunación por especie
pub struct SpeciesVaccinationPlanService {
    repository: SpeciesVaccinationPlanRepository,
    species: SpeciesService,
}

impl SpeciesVaccinationPlanService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SpeciesVaccinationPlanRepository::new(pool.clone()),
            species: SpeciesService::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateSpeciesVaccinationPlanRequest,
    ) -> AppResult<SpeciesVaccinationPlan> {
        request.validate()?;
        self.species.get(request.species_id).await?;

        let template = self.repository.create(request).await?;
        log::info!("💉 Plantilla de vacunación creada: {} ({})", template.name, template.id);
        Ok(template)
    }

    pub async fn get(&self, id: i32) -> AppResult<SpeciesVaccinationPlan> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Plantilla de vacunación", id))
    }

    /// Plantilla con sus líneas de vacuna
    pub async fn detail(&self, id: i32) -> AppResult<SpeciesVaccinationPlanDetail> {
        let template = self.get(id).await?;
        let vaccines = self.repository.vaccines(template.id).await?;
        Ok(SpeciesVaccinationPlanDetail { template, vaccines })
    }

    pub async fn list(
        &self,
        filters: SpeciesVaccinationPlanFilters,
    ) -> AppResult<Paginated<SpeciesVaccinationPlan>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (templates, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(templates, total, page, LIST_PATH))
    }

    pub async fn update(
        &self,
        id: i32,
        request: UpdateSpeciesVaccinationPlanRequest,
    ) -> AppResult<SpeciesVaccinationPlan> {
        request.validate()?;
        let mut template = self.get(id).await?;
        request.merge_into(&mut template);
        self.repository.update(&template).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Plantilla de vacunación", id));
        }
        Ok(())
    }

    // Vacunas

    pub async fn vaccines(&self, template_id: i32) -> AppResult<Vec<Vaccine>> {
        self.get(template_id).await?;
        self.repository.vaccines(template_id).await
    }

    pub async fn get_vaccine(&self, id: i32) -> AppResult<Vaccine> {
        self.repository
            .find_vaccine(id)
            .await?
            .ok_or_else(|| not_found_error("Vacuna", id))
    }

    pub async fn add_vaccine(&self, template_id: i32, request: CreateVaccineRequest) -> AppResult<Vaccine> {
        request.validate()?;
        self.get(template_id).await?;

        let vaccine = self.repository.create_vaccine(template_id, request).await?;
        log::info!(
            "💉 Vacuna '{}' agregada a la plantilla {} ({} meses)",
            vaccine.name,
            template_id,
            vaccine.application_age
        );
        Ok(vaccine)
    }

    pub async fn update_vaccine(&self, id: i32, request: UpdateVaccineRequest) -> AppResult<Vaccine> {
        request.validate()?;
        let mut vaccine = self.get_vaccine(id).await?;
        request.merge_into(&mut vaccine);
        self.repository.update_vaccine(&vaccine).await
    }

    pub async fn delete_vaccine(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete_vaccine(id).await? {
            return Err(not_found_error("Vacuna", id));
        }
        Ok(())
    }
}
