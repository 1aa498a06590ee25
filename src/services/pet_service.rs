use axum::extract::Multipart;
use sqlx::PgPool;
use validator::Validate;

use crate::config::EnvironmentConfig;
use crate::dto::pet_dto::{CreatePetRequest, PetDetailResponse, PetFilters, UpdatePetRequest};
use crate::models::pet::{Pet, PetImage};
use crate::repositories::pet_repository::PetRepository;
use crate::services::person_service::PersonService;
use crate::services::species_service::SpeciesService;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};
use crate::utils::uploads::{remove_upload, store_upload, IMAGE_TYPES, PET_IMAGES_DIR};

const LIST_PATH: &str = "/api/pets";

pub struct PetService {
    pool: PgPool,
    repository: PetRepository,
    persons: PersonService,
    species: SpeciesService,
}

impl PetService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PetRepository::new(pool.clone()),
            persons: PersonService::new(pool.clone()),
            species: SpeciesService::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, request: CreatePetRequest) -> AppResult<Pet> {
        request.validate()?;
        self.persons.get(request.owner_id).await?;
        self.species.get(request.species_id).await?;

        let pet = self.repository.create(request).await?;
        log::info!("🐶 Mascota registrada: {} ({})", pet.name, pet.id);
        Ok(pet)
    }

    pub async fn get(&self, id: i32) -> AppResult<Pet> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Mascota", id))
    }

    pub async fn detail(&self, id: i32) -> AppResult<PetDetailResponse> {
        let pet = self.get(id).await?;
        let owner = self.persons.get(pet.owner_id).await?;
        let species = self.species.get(pet.species_id).await?;
        let images = self.repository.images(pet.id).await?;
        Ok(PetDetailResponse::new(pet, owner, species, images))
    }

    pub async fn list(&self, filters: PetFilters) -> AppResult<Paginated<Pet>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (pets, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(pets, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdatePetRequest) -> AppResult<Pet> {
        request.validate()?;
        let mut pet = self.get(id).await?;

        if let Some(owner_id) = request.owner_id {
            self.persons.get(owner_id).await?;
        }
        if let Some(species_id) = request.species_id {
            self.species.get(species_id).await?;
        }

        request.merge_into(&mut pet);
        self.repository.update(&pet).await
    }

    pub async fn delete(&self, id: i32, config: &EnvironmentConfig) -> AppResult<()> {
        let images = self.repository.images(id).await?;
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Mascota", id));
        }
        for image in images {
            remove_upload(&config.upload_dir, &image.url).await;
        }
        log::info!("🗑️ Mascota eliminada: {}", id);
        Ok(())
    }

    // Imágenes

    pub async fn images(&self, pet_id: i32) -> AppResult<Vec<PetImage>> {
        self.get(pet_id).await?;
        self.repository.images(pet_id).await
    }

    /// La primera imagen de una mascota queda como principal.
    pub async fn upload_image(
        &self,
        pet_id: i32,
        multipart: &mut Multipart,
        config: &EnvironmentConfig,
    ) -> AppResult<PetImage> {
        self.get(pet_id).await?;

        let stored = store_upload(
            multipart,
            &config.upload_dir,
            PET_IMAGES_DIR,
            IMAGE_TYPES,
            config.max_upload_bytes,
        )
        .await?;

        match self.insert_image(pet_id, &stored.url).await {
            Ok(image) => {
                log::info!(
                    "🖼️ Imagen {} agregada a la mascota {} ({} bytes)",
                    image.id,
                    pet_id,
                    stored.size
                );
                Ok(image)
            }
            Err(e) => {
                remove_upload(&config.upload_dir, &stored.url).await;
                Err(e)
            }
        }
    }

    async fn insert_image(&self, pet_id: i32, url: &str) -> AppResult<PetImage> {
        let mut tx = self.pool.begin().await?;
        PetRepository::lock(&mut tx, pet_id)
            .await?
            .ok_or_else(|| not_found_error("Mascota", pet_id))?;
        let has_main = PetRepository::has_main_image(&mut tx, pet_id).await?;
        let image = PetRepository::insert_image(&mut tx, pet_id, url, !has_main).await?;
        tx.commit().await?;
        Ok(image)
    }

    pub async fn set_main_image(&self, image_id: i32) -> AppResult<PetImage> {
        let mut tx = self.pool.begin().await?;
        let image = PetRepository::lock_image(&mut tx, image_id)
            .await?
            .ok_or_else(|| not_found_error("Imagen", image_id))?;

        if image.is_main {
            tx.commit().await?;
            return Ok(image);
        }

        PetRepository::lock(&mut tx, image.pet_id).await?;
        PetRepository::clear_main_image(&mut tx, image.pet_id).await?;
        let image = PetRepository::mark_main_image(&mut tx, image_id).await?;
        tx.commit().await?;

        log::info!("⭐ Imagen {} es ahora la principal de la mascota {}", image.id, image.pet_id);
        Ok(image)
    }

    pub async fn delete_image(&self, image_id: i32, config: &EnvironmentConfig) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let image = PetRepository::lock_image(&mut tx, image_id)
            .await?
            .ok_or_else(|| not_found_error("Imagen", image_id))?;

        PetRepository::lock(&mut tx, image.pet_id).await?;
        PetRepository::delete_image(&mut tx, image.id).await?;
        if image.is_main {
            PetRepository::promote_latest_image(&mut tx, image.pet_id).await?;
        }
        tx.commit().await?;

        remove_upload(&config.upload_dir, &image.url).await;
        Ok(())
    }
}
