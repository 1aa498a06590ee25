use sqlx::PgPool;
use validator::Validate;

use crate::dto::species_dto::{CreateSpeciesRequest, SpeciesFilters, UpdateSpeciesRequest};
use crate::models::species::Species;
use crate::repositories::species_repository::SpeciesRepository;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/species";

pub struct SpeciesService {
    repository: SpeciesRepository,
}

impl SpeciesService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SpeciesRepository::new(pool),
        }
    }

    pub async fn create(&self, request: CreateSpeciesRequest) -> AppResult<Species> {
        request.validate()?;
        let species = self.repository.create(request).await?;
        log::info!("🐾 Especie creada: {}", species.name);
        Ok(species)
    }

    pub async fn get(&self, id: i32) -> AppResult<Species> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Especie", id))
    }

    pub async fn list(&self, filters: SpeciesFilters) -> AppResult<Paginated<Species>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (species, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(species, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdateSpeciesRequest) -> AppResult<Species> {
        request.validate()?;
        let mut species = self.get(id).await?;
        request.merge_into(&mut species);
        self.repository.update(&species).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Especie", id));
        }
        Ok(())
    }
}
