use sqlx::PgPool;
use validator::Validate;

use crate::dto::person_dto::{CreatePersonRequest, PersonFilters, UpdatePersonRequest};
use crate::models::person::Person;
use crate::repositories::person_repository::PersonRepository;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/persons";

pub struct PersonService {
    repository: PersonRepository,
}

impl PersonService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PersonRepository::new(pool),
        }
    }

    pub async fn create(&self, request: CreatePersonRequest) -> AppResult<Person> {
        request.validate()?;
        let person = self.repository.create(request).await?;
        log::info!("👤 Persona registrada: {} ({})", person.full_name(), person.id);
        Ok(person)
    }

    pub async fn get(&self, id: i32) -> AppResult<Person> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Persona", id))
    }

    /// Persona que debe tener rol `staff` (veterinarios).
    pub async fn require_staff(&self, id: i32) -> AppResult<Person> {
        let person = self.get(id).await?;
        if !person.is_staff() {
            log::warn!("⚠️ La persona {} no es personal de la clínica", id);
            return Err(AppError::BadRequest(format!(
                "La persona con id {} no es personal de la clínica",
                id
            )));
        }
        Ok(person)
    }

    pub async fn list(&self, filters: PersonFilters) -> AppResult<Paginated<Person>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (persons, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(persons, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdatePersonRequest) -> AppResult<Person> {
        request.validate()?;
        let mut person = self.get(id).await?;
        request.merge_into(&mut person);
        self.repository.update(&person).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Persona", id));
        }
        log::info!("🗑️ Persona eliminada: {}", id);
        Ok(())
    }
}
