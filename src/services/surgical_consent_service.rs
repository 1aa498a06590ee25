use axum::extract::Multipart;
use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::config::EnvironmentConfig;
use crate::dto::surgical_consent_dto::{
    CreateSurgicalConsentRequest, SurgicalConsentFilters, UpdateSurgicalConsentRequest,
};
use crate::models::surgical_consent::SurgicalConsent;
use crate::repositories::surgical_consent_repository::SurgicalConsentRepository;
use crate::services::person_service::PersonService;
use crate::services::pet_service::PetService;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};
use crate::utils::uploads::{remove_upload, store_upload, CONSENT_DOCUMENTS_DIR, PDF_TYPES};

const LIST_PATH: &str = "/api/surgical-consents";

pub struct SurgicalConsentService {
    pool: PgPool,
    repository: SurgicalConsentRepository,
    pets: PetService,
    persons: PersonService,
}

impl SurgicalConsentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SurgicalConsentRepository::new(pool.clone()),
            pets: PetService::new(pool.clone()),
            persons: PersonService::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, request: CreateSurgicalConsentRequest) -> AppResult<SurgicalConsent> {
        request.validate()?;
        let pet = self.pets.get(request.pet_id).await?;
        self.persons.get(request.owner_id).await?;
        self.persons.require_staff(request.veterinarian_id).await?;

        if pet.owner_id != request.owner_id {
            return Err(AppError::BadRequest(format!(
                "La persona {} no es la dueña de la mascota {}",
                request.owner_id, pet.id
            )));
        }

        let consent = self.repository.create(request).await?;
        log::info!("📝 Consentimiento {} creado para la mascota {}", consent.id, consent.pet_id);
        Ok(consent)
    }

    pub async fn get(&self, id: i32) -> AppResult<SurgicalConsent> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Consentimiento", id))
    }

    pub async fn list(&self, filters: SurgicalConsentFilters) -> AppResult<Paginated<SurgicalConsent>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (consents, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(consents, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdateSurgicalConsentRequest) -> AppResult<SurgicalConsent> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut consent = SurgicalConsentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Consentimiento", id))?;

        consent.ensure_pending()?;
        request.merge_into(&mut consent);
        let consent = SurgicalConsentRepository::save(&mut tx, &consent).await?;
        tx.commit().await?;
        Ok(consent)
    }

    /// Guarda el PDF firmado y marca el consentimiento como firmado.
    pub async fn attach_document(
        &self,
        id: i32,
        multipart: &mut Multipart,
        config: &EnvironmentConfig,
    ) -> AppResult<SurgicalConsent> {
        self.get(id).await?.ensure_pending()?;

        let stored = store_upload(
            multipart,
            &config.upload_dir,
            CONSENT_DOCUMENTS_DIR,
            PDF_TYPES,
            config.max_upload_bytes,
        )
        .await?;

        match self.sign(id, stored.url.clone()).await {
            Ok(consent) => {
                log::info!("🖊️ Consentimiento {} firmado", id);
                Ok(consent)
            }
            Err(e) => {
                remove_upload(&config.upload_dir, &stored.url).await;
                Err(e)
            }
        }
    }

    async fn sign(&self, id: i32, document_url: String) -> AppResult<SurgicalConsent> {
        let mut tx = self.pool.begin().await?;
        let mut consent = SurgicalConsentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Consentimiento", id))?;
        consent.sign(Utc::now(), document_url)?;
        let consent = SurgicalConsentRepository::save(&mut tx, &consent).await?;
        tx.commit().await?;
        Ok(consent)
    }

    pub async fn reject(&self, id: i32) -> AppResult<SurgicalConsent> {
        let mut tx = self.pool.begin().await?;
        let mut consent = SurgicalConsentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Consentimiento", id))?;
        consent.reject()?;
        let consent = SurgicalConsentRepository::save(&mut tx, &consent).await?;
        tx.commit().await?;

        log::info!("❌ Consentimiento {} rechazado", id);
        Ok(consent)
    }

    pub async fn delete(&self, id: i32, config: &EnvironmentConfig) -> AppResult<()> {
        let consent = self.get(id).await?;
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Consentimiento", id));
        }
        if let Some(url) = consent.document_url {
            remove_upload(&config.upload_dir, &url).await;
        }
        Ok(())
    }
}
