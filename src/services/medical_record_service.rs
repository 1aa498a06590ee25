use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::dto::medical_record_dto::{
    CreateMedicalRecordRequest, MedicalRecordFilters, UpdateMedicalRecordRequest,
};
use crate::models::medical_record::MedicalRecord;
use crate::repositories::appointment_repository::AppointmentRepository;
use crate::repositories::medical_record_repository::{MedicalRecordRepository, NewMedicalRecord};
use crate::services::person_service::PersonService;
use crate::services::pet_service::PetService;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/medical-records";

pub struct MedicalRecordService {
    repository: MedicalRecordRepository,
    appointments: AppointmentRepository,
    pets: PetService,
    persons: PersonService,
}

impl MedicalRecordService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: MedicalRecordRepository::new(pool.clone()),
            appointments: AppointmentRepository::new(pool.clone()),
            pets: PetService::new(pool.clone()),
            persons: PersonService::new(pool),
        }
    }

    /// La cita vinculada debe existir y ser de la misma mascota.
    async fn check_appointment(&self, appointment_id: Option<i32>, pet_id: i32) -> AppResult<()> {
        let Some(appointment_id) = appointment_id else {
            return Ok(());
        };

        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| not_found_error("Cita", appointment_id))?;

        if appointment.pet_id != pet_id {
            return Err(AppError::BadRequest(format!(
                "La cita {} no corresponde a la mascota {}",
                appointment_id, pet_id
            )));
        }
        Ok(())
    }

    pub async fn create(&self, request: CreateMedicalRecordRequest) -> AppResult<MedicalRecord> {
        request.validate()?;
        self.pets.get(request.pet_id).await?;
        self.persons.require_staff(request.veterinarian_id).await?;
        self.check_appointment(request.appointment_id, request.pet_id).await?;

        let record = self
            .repository
            .create(NewMedicalRecord {
                pet_id: request.pet_id,
                veterinarian_id: request.veterinarian_id,
                appointment_id: request.appointment_id,
                visit_date: request.visit_date.unwrap_or_else(Utc::now),
                reason: request.reason.trim().to_string(),
                diagnosis: request.diagnosis,
                treatment: request.treatment,
                observations: request.observations,
                weight: request.weight,
                temperature: request.temperature,
            })
            .await?;

        log::info!("📋 Historia clínica {} creada para la mascota {}", record.id, record.pet_id);
        Ok(record)
    }

    pub async fn get(&self, id: i32) -> AppResult<MedicalRecord> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Historia clínica", id))
    }

    pub async fn list(&self, filters: MedicalRecordFilters) -> AppResult<Paginated<MedicalRecord>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (records, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(records, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdateMedicalRecordRequest) -> AppResult<MedicalRecord> {
        request.validate()?;
        let mut record = self.get(id).await?;
        request.merge_into(&mut record);
        self.check_appointment(record.appointment_id, record.pet_id).await?;
        self.repository.update(&record).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Historia clínica", id));
        }
        Ok(())
    }
}
