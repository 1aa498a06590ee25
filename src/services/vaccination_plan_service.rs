//! Planes de vacunación de una mascota
//!
//! La inscripción valida mascota y plantilla, y luego inserta el plan junto
//! con un registro pendiente por cada vacuna de la plantilla en una sola
//! transacción. La fila de la mascota queda bloqueada mientras se verifica
//! que no exista otro plan activo de la misma plantilla.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::config::VaccinationSchedulePolicy;
use crate::dto::vaccination_dto::{
    AddVaccinationRecordRequest, CreateVaccinationPlanRequest, PetWithOwner,
    UpdateVaccinationPlanRequest, VaccinationPlanDetail, VaccinationPlanFilters,
    VaccinationRecordWithVaccine,
};
use crate::models::pet::Pet;
use crate::models::vaccination::{
    NewVaccinationRecord, SpeciesVaccinationPlan, VaccinationPlan, VaccinationPlanStatus,
    VaccinationRecord, Vaccine,
};
use crate::repositories::pet_repository::PetRepository;
use crate::repositories::species_vaccination_plan_repository::SpeciesVaccinationPlanRepository;
use crate::repositories::vaccination_plan_repository::{VaccinationPlanRepository, ALREADY_ENROLLED};
use crate::repositories::vaccination_record_repository::{
    VaccinationRecordRepository, DUPLICATE_PENDING,
};
use crate::services::person_service::PersonService;
use crate::services::pet_service::PetService;
use crate::services::species_service::SpeciesService;
use crate::services::vaccination_schedule::clone_template;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/vaccination-plans";

fn initial_status(requested: Option<VaccinationPlanStatus>) -> AppResult<VaccinationPlanStatus> {
    match requested.unwrap_or(VaccinationPlanStatus::Activo) {
        VaccinationPlanStatus::Completado => Err(AppError::BadRequest(
            "Un plan no puede crearse como completado".to_string(),
        )),
        status => Ok(status),
    }
}

fn ensure_template_applies(pet: &Pet, template: &SpeciesVaccinationPlan) -> AppResult<()> {
    if template.species_id != pet.species_id {
        log::warn!(
            "⚠️ Plantilla {} (especie {}) no aplica a la mascota {} (especie {})",
            template.id,
            template.species_id,
            pet.id,
            pet.species_id
        );
        return Err(AppError::BadRequest(
            "La plantilla de vacunación no corresponde a la especie de la mascota".to_string(),
        ));
    }
    Ok(())
}

fn ensure_not_enrolled(pet_id: i32, template_id: i32, already_active: bool) -> AppResult<()> {
    if already_active {
        log::warn!("⚠️ La mascota {} ya tiene activa la plantilla {}", pet_id, template_id);
        return Err(AppError::Conflict(ALREADY_ENROLLED.to_string()));
    }
    Ok(())
}

/// Empareja cada registro con su vacuna, conservando el orden de los registros.
pub fn attach_vaccines(
    records: Vec<VaccinationRecord>,
    vaccines: Vec<Vaccine>,
) -> AppResult<Vec<VaccinationRecordWithVaccine>> {
    let by_id: HashMap<i32, Vaccine> = vaccines.into_iter().map(|v| (v.id, v)).collect();

    records
        .into_iter()
        .map(|record| {
            let vaccine = by_id.get(&record.vaccine_id).cloned().ok_or_else(|| {
                AppError::Internal(format!(
                    "El registro {} referencia la vacuna inexistente {}",
                    record.id, record.vaccine_id
                ))
            })?;
            Ok(VaccinationRecordWithVaccine { record, vaccine })
        })
        .collect()
}

pub struct VaccinationPlanService {
    pool: PgPool,
    policy: VaccinationSchedulePolicy,
    plans: VaccinationPlanRepository,
    records: VaccinationRecordRepository,
    templates: SpeciesVaccinationPlanRepository,
    pets: PetService,
    persons: PersonService,
    species: SpeciesService,
}

impl VaccinationPlanService {
    pub fn new(pool: PgPool, policy: VaccinationSchedulePolicy) -> Self {
        Self {
            plans: VaccinationPlanRepository::new(pool.clone()),
            records: VaccinationRecordRepository::new(pool.clone()),
            templates: SpeciesVaccinationPlanRepository::new(pool.clone()),
            pets: PetService::new(pool.clone()),
            persons: PersonService::new(pool.clone()),
            species: SpeciesService::new(pool.clone()),
            pool,
            policy,
        }
    }

    /// Inscribe una mascota en una plantilla y programa sus vacunas.
    pub async fn create(&self, request: CreateVaccinationPlanRequest) -> AppResult<VaccinationPlanDetail> {
        request.validate()?;
        let status = initial_status(request.status)?;

        let pet = self.pets.get(request.pet_id).await?;
        let template = self
            .templates
            .find_by_id(request.species_vaccination_plan_id)
            .await?
            .ok_or_else(|| {
                not_found_error("Plantilla de vacunación", request.species_vaccination_plan_id)
            })?;
        let vaccines = self.templates.vaccines(template.id).await?;

        ensure_template_applies(&pet, &template)?;

        let new_records = clone_template(
            &self.policy,
            &template,
            &vaccines,
            pet.age_in_months(),
            Utc::now(),
        )?;

        let mut tx = self.pool.begin().await?;
        PetRepository::lock(&mut tx, pet.id)
            .await?
            .ok_or_else(|| not_found_error("Mascota", pet.id))?;

        let already_active = VaccinationPlanRepository::active_exists(&mut tx, pet.id, template.id).await?;
        ensure_not_enrolled(pet.id, template.id, already_active)?;

        let plan =
            VaccinationPlanRepository::insert(&mut tx, pet.id, template.id, status, request.notes.as_deref())
                .await?;
        for record in &new_records {
            VaccinationRecordRepository::insert(&mut tx, plan.id, record).await?;
        }
        tx.commit().await?;

        log::info!(
            "💉 Mascota {} inscrita en '{}' (plan {}, {} vacunas programadas)",
            pet.id,
            template.name,
            plan.id,
            new_records.len()
        );
        self.detail(plan.id).await
    }

    pub async fn get(&self, id: i32) -> AppResult<VaccinationPlan> {
        self.plans
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Plan de vacunación", id))
    }

    /// Plan con mascota y dueño, especie, plantilla y registros con su vacuna
    pub async fn detail(&self, id: i32) -> AppResult<VaccinationPlanDetail> {
        let plan = self.get(id).await?;
        let pet = self.pets.get(plan.pet_id).await?;
        let owner = self.persons.get(pet.owner_id).await?;
        let species = self.species.get(pet.species_id).await?;
        let template = self
            .templates
            .find_by_id(plan.species_vaccination_plan_id)
            .await?
            .ok_or_else(|| {
                not_found_error("Plantilla de vacunación", plan.species_vaccination_plan_id)
            })?;

        let records = self.records_with_vaccines(plan.id).await?;

        Ok(VaccinationPlanDetail {
            id: plan.id,
            status: plan.status,
            notes: plan.notes,
            created_at: plan.created_at,
            pet: PetWithOwner { pet, owner },
            species,
            species_vaccination_plan: template,
            records,
        })
    }

    pub async fn list(&self, filters: VaccinationPlanFilters) -> AppResult<Paginated<VaccinationPlan>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (plans, total) = self.plans.list(&filters, page).await?;
        Ok(Paginated::new(plans, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdateVaccinationPlanRequest) -> AppResult<VaccinationPlan> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut plan = VaccinationPlanRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Plan de vacunación", id))?;

        request.merge_into(&mut plan);
        let plan = VaccinationPlanRepository::save(&mut tx, &plan).await?;
        tx.commit().await?;
        Ok(plan)
    }

    /// Activa o desactiva el plan. Al activar se vuelve a verificar que no
    /// haya otro plan activo de la misma plantilla para la mascota.
    pub async fn set_active(&self, id: i32, active: bool) -> AppResult<VaccinationPlan> {
        let mut tx = self.pool.begin().await?;
        let mut plan = VaccinationPlanRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Plan de vacunación", id))?;

        plan.set_active(active)?;

        if active {
            PetRepository::lock(&mut tx, plan.pet_id).await?;
            let already_active =
                VaccinationPlanRepository::active_exists(&mut tx, plan.pet_id, plan.species_vaccination_plan_id)
                    .await?;
            ensure_not_enrolled(plan.pet_id, plan.species_vaccination_plan_id, already_active)?;
        }

        let plan = VaccinationPlanRepository::save(&mut tx, &plan).await?;
        tx.commit().await?;

        log::info!("🔄 Plan de vacunación {} ahora está '{}'", id, plan.status);
        Ok(plan)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.plans.delete(id).await? {
            return Err(not_found_error("Plan de vacunación", id));
        }
        log::info!("🗑️ Plan de vacunación {} eliminado", id);
        Ok(())
    }

    // Registros del plan

    pub async fn records(&self, id: i32) -> AppResult<Vec<VaccinationRecordWithVaccine>> {
        self.get(id).await?;
        self.records_with_vaccines(id).await
    }

    async fn records_with_vaccines(&self, plan_id: i32) -> AppResult<Vec<VaccinationRecordWithVaccine>> {
        let records = self.records.for_plan(plan_id).await?;
        let mut vaccine_ids: Vec<i32> = records.iter().map(|r| r.vaccine_id).collect();
        vaccine_ids.sort_unstable();
        vaccine_ids.dedup();
        let vaccines = self.templates.vaccines_by_ids(&vaccine_ids).await?;
        attach_vaccines(records, vaccines)
    }

    /// Agrega una dosis fuera de la programación automática.
    pub async fn add_record(
        &self,
        plan_id: i32,
        request: AddVaccinationRecordRequest,
    ) -> AppResult<VaccinationRecord> {
        request.validate()?;

        let vaccine = self
            .templates
            .find_vaccine(request.vaccine_id)
            .await?
            .ok_or_else(|| not_found_error("Vacuna", request.vaccine_id))?;

        let mut tx = self.pool.begin().await?;
        let plan = VaccinationPlanRepository::lock(&mut tx, plan_id)
            .await?
            .ok_or_else(|| not_found_error("Plan de vacunación", plan_id))?;

        if plan.status == VaccinationPlanStatus::Completado {
            return Err(AppError::BadRequest(
                "No se pueden agregar vacunas a un plan completado".to_string(),
            ));
        }
        if vaccine.species_vaccination_plan_id != plan.species_vaccination_plan_id {
            return Err(AppError::BadRequest(format!(
                "La vacuna {} no pertenece a la plantilla del plan",
                vaccine.id
            )));
        }
        if VaccinationRecordRepository::pending_exists(&mut tx, plan.id, vaccine.id).await? {
            return Err(AppError::Conflict(DUPLICATE_PENDING.to_string()));
        }

        let record = VaccinationRecordRepository::insert(
            &mut tx,
            plan.id,
            &NewVaccinationRecord {
                vaccine_id: vaccine.id,
                plan_vaccine_id: Some(vaccine.id),
                enabled: true,
                scheduled_date: request.scheduled_date,
                notes: request.notes,
            },
        )
        .await?;
        tx.commit().await?;

        log::info!("➕ Vacuna '{}' agregada al plan {} (registro {})", vaccine.name, plan.id, record.id);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pet::PetSex;
    use crate::models::vaccination::VaccinationRecordStatus;

    fn record(id: i32, vaccine_id: i32) -> VaccinationRecord {
        VaccinationRecord {
            id,
            vaccination_plan_id: 1,
            vaccine_id,
            plan_vaccine_id: Some(vaccine_id),
            enabled: true,
            scheduled_date: Utc::now(),
            administered_date: None,
            administered_by: None,
            batch_number: None,
            status: VaccinationRecordStatus::Pendiente,
            notes: None,
        }
    }

    fn vaccine(id: i32) -> Vaccine {
        Vaccine {
            id,
            species_vaccination_plan_id: 1,
            name: format!("Vacuna {}", id),
            description: None,
            application_age: 2,
            validity: 12,
            is_mandatory: true,
        }
    }

    #[test]
    fn test_attach_vaccines_keeps_record_order() {
        let records = vec![record(3, 20), record(1, 10), record(2, 20)];
        let attached = attach_vaccines(records, vec![vaccine(10), vaccine(20)]).unwrap();

        assert_eq!(attached.iter().map(|r| r.record.id).collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(attached[0].vaccine.id, 20);
        assert_eq!(attached[1].vaccine.id, 10);
    }

    #[test]
    fn test_attach_vaccines_missing_vaccine() {
        let result = attach_vaccines(vec![record(1, 99)], vec![vaccine(10)]);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    fn pet(species_id: i32) -> Pet {
        Pet {
            id: 5,
            name: "Luna".to_string(),
            species_id,
            breed: None,
            sex: PetSex::Hembra,
            birth_date: None,
            age: Some(3),
            weight: None,
            color: None,
            microchip: None,
            owner_id: 1,
            created_at: Utc::now(),
        }
    }

    fn template(species_id: i32) -> SpeciesVaccinationPlan {
        SpeciesVaccinationPlan {
            id: 8,
            species_id,
            name: "Plan felino".to_string(),
            description: None,
            recommended_age: 2,
        }
    }

    #[test]
    fn test_template_of_other_species_is_rejected() {
        let result = ensure_template_applies(&pet(1), &template(2));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(ensure_template_applies(&pet(2), &template(2)).is_ok());
    }

    #[test]
    fn test_active_enrollment_conflicts() {
        match ensure_not_enrolled(5, 8, true) {
            Err(AppError::Conflict(message)) => assert_eq!(message, ALREADY_ENROLLED),
            other => panic!("se esperaba conflicto, se obtuvo {:?}", other),
        }
        assert!(ensure_not_enrolled(5, 8, false).is_ok());
    }

    #[test]
    fn test_enrollment_schedules_one_record_per_vaccine() {
        let policy = VaccinationSchedulePolicy::default();
        let vaccines = vec![vaccine(10), vaccine(11), vaccine(12)];
        let records = clone_template(&policy, &template(1), &vaccines, 3, Utc::now()).unwrap();

        assert_eq!(records.len(), vaccines.len());
        assert_eq!(records.iter().map(|r| r.vaccine_id).collect::<Vec<_>>(), vec![10, 11, 12]);
        assert!(records.iter().all(|r| r.plan_vaccine_id == Some(r.vaccine_id)));
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(initial_status(None).unwrap(), VaccinationPlanStatus::Activo);
        assert_eq!(
            initial_status(Some(VaccinationPlanStatus::Inactivo)).unwrap(),
            VaccinationPlanStatus::Inactivo
        );
        assert!(matches!(
            initial_status(Some(VaccinationPlanStatus::Completado)),
            Err(AppError::BadRequest(_))
        ));
    }
}
