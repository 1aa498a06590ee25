use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::person::Person;
use crate::models::pet::Pet;
use crate::models::species::Species;
use crate::models::vaccination::{
    Application, SpeciesVaccinationPlan, VaccinationPlan, VaccinationPlanStatus,
    VaccinationRecord, VaccinationRecordStatus, Vaccine,
};
use crate::utils::validation::validate_not_blank;

// ---------------------------------------------------------------------------
// Plantillas por especie
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSpeciesVaccinationPlanRequest {
    pub species_id: i32,
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 600))]
    pub recommended_age: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSpeciesVaccinationPlanRequest {
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 600))]
    pub recommended_age: Option<i32>,
}

impl UpdateSpeciesVaccinationPlanRequest {
    pub fn merge_into(self, template: &mut SpeciesVaccinationPlan) {
        if let Some(name) = self.name {
            template.name = name;
        }
        if self.description.is_some() {
            template.description = self.description;
        }
        if let Some(recommended_age) = self.recommended_age {
            template.recommended_age = recommended_age;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SpeciesVaccinationPlanFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub species_id: Option<i32>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SpeciesVaccinationPlanDetail {
    #[serde(flatten)]
    pub template: SpeciesVaccinationPlan,
    pub vaccines: Vec<Vaccine>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVaccineRequest {
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Edad de aplicación en meses
    #[validate(range(min = 0, max = 600))]
    pub application_age: i32,
    /// Vigencia en meses
    #[validate(range(min = 0, max = 600))]
    pub validity: i32,
    pub is_mandatory: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVaccineRequest {
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 600))]
    pub application_age: Option<i32>,
    #[validate(range(min = 0, max = 600))]
    pub validity: Option<i32>,
    pub is_mandatory: Option<bool>,
}

impl UpdateVaccineRequest {
    pub fn merge_into(self, vaccine: &mut Vaccine) {
        if let Some(name) = self.name {
            vaccine.name = name;
        }
        if self.description.is_some() {
            vaccine.description = self.description;
        }
        if let Some(application_age) = self.application_age {
            vaccine.application_age = application_age;
        }
        if let Some(validity) = self.validity {
            vaccine.validity = validity;
        }
        if let Some(is_mandatory) = self.is_mandatory {
            vaccine.is_mandatory = is_mandatory;
        }
    }
}

// ---------------------------------------------------------------------------
// Planes de una mascota
// ---------------------------------------------------------------------------

// Request para inscribir una mascota en una plantilla
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVaccinationPlanRequest {
    pub pet_id: i32,
    pub species_vaccination_plan_id: i32,
    /// `activo` por defecto; `completado` no se acepta al inscribir
    pub status: Option<VaccinationPlanStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Solo las notas son editables; el estado cambia con activate/deactivate.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVaccinationPlanRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl UpdateVaccinationPlanRequest {
    pub fn merge_into(self, plan: &mut VaccinationPlan) {
        if self.notes.is_some() {
            plan.notes = self.notes;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VaccinationPlanFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub pet_id: Option<i32>,
    pub species_vaccination_plan_id: Option<i32>,
    pub status: Option<VaccinationPlanStatus>,
}

#[derive(Debug, Serialize)]
pub struct PetWithOwner {
    #[serde(flatten)]
    pub pet: Pet,
    pub owner: Person,
}

#[derive(Debug, Serialize)]
pub struct VaccinationRecordWithVaccine {
    #[serde(flatten)]
    pub record: VaccinationRecord,
    pub vaccine: Vaccine,
}

/// Plan completo: mascota con dueño, especie, plantilla y registros
#[derive(Debug, Serialize)]
pub struct VaccinationPlanDetail {
    pub id: i32,
    pub status: VaccinationPlanStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub pet: PetWithOwner,
    pub species: Species,
    pub species_vaccination_plan: SpeciesVaccinationPlan,
    pub records: Vec<VaccinationRecordWithVaccine>,
}

// ---------------------------------------------------------------------------
// Registros
// ---------------------------------------------------------------------------

// Request para agregar una dosis manualmente a un plan
#[derive(Debug, Deserialize, Validate)]
pub struct AddVaccinationRecordRequest {
    pub vaccine_id: i32,
    pub scheduled_date: DateTime<Utc>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ApplyVaccinationRequest {
    /// Por defecto, el momento de la aplicación
    pub administered_date: Option<DateTime<Utc>>,
    pub administered_by: Option<i32>,
    #[validate(length(min = 1, max = 50))]
    pub batch_number: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<ApplyVaccinationRequest> for Application {
    fn from(request: ApplyVaccinationRequest) -> Self {
        Self {
            administered_date: request.administered_date,
            administered_by: request.administered_by,
            batch_number: request.batch_number,
            notes: request.notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RescheduleVaccinationRequest {
    pub scheduled_date: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VaccinationRecordFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub vaccination_plan_id: Option<i32>,
    pub vaccine_id: Option<i32>,
    pub status: Option<VaccinationRecordStatus>,
    pub enabled: Option<bool>,
    pub scheduled_from: Option<DateTime<Utc>>,
    pub scheduled_to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_with_vaccine_is_flat() {
        let detail = VaccinationRecordWithVaccine {
            record: VaccinationRecord {
                id: 7,
                vaccination_plan_id: 1,
                vaccine_id: 3,
                plan_vaccine_id: Some(3),
                enabled: true,
                scheduled_date: Utc::now(),
                administered_date: None,
                administered_by: None,
                batch_number: None,
                status: VaccinationRecordStatus::Pendiente,
                notes: None,
            },
            vaccine: Vaccine {
                id: 3,
                species_vaccination_plan_id: 1,
                name: "Rabia".to_string(),
                description: None,
                application_age: 3,
                validity: 12,
                is_mandatory: true,
            },
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["status"], "pendiente");
        assert_eq!(json["vaccine"]["name"], "Rabia");
    }

    #[test]
    fn test_apply_request_into_application() {
        let application: Application = ApplyVaccinationRequest {
            batch_number: Some("L-77".to_string()),
            ..Default::default()
        }
        .into();
        assert_eq!(application.batch_number.as_deref(), Some("L-77"));
        assert!(application.administered_date.is_none());
    }

    #[test]
    fn test_empty_batch_number_is_invalid() {
        let request = ApplyVaccinationRequest {
            batch_number: Some(String::new()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
