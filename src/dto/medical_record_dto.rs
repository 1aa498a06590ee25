use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::medical_record::MedicalRecord;
use crate::utils::validation::{validate_not_blank, validate_positive_decimal};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMedicalRecordRequest {
    pub pet_id: i32,
    pub veterinarian_id: i32,
    pub appointment_id: Option<i32>,
    pub visit_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub reason: String,
    #[validate(length(max = 4000))]
    pub diagnosis: Option<String>,
    #[validate(length(max = 4000))]
    pub treatment: Option<String>,
    #[validate(length(max = 4000))]
    pub observations: Option<String>,
    #[validate(custom = "validate_positive_decimal")]
    pub weight: Option<Decimal>,
    #[validate(custom = "validate_positive_decimal")]
    pub temperature: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMedicalRecordRequest {
    pub appointment_id: Option<i32>,
    pub visit_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub reason: Option<String>,
    #[validate(length(max = 4000))]
    pub diagnosis: Option<String>,
    #[validate(length(max = 4000))]
    pub treatment: Option<String>,
    #[validate(length(max = 4000))]
    pub observations: Option<String>,
    #[validate(custom = "validate_positive_decimal")]
    pub weight: Option<Decimal>,
    #[validate(custom = "validate_positive_decimal")]
    pub temperature: Option<Decimal>,
}

impl UpdateMedicalRecordRequest {
    pub fn merge_into(self, record: &mut MedicalRecord) {
        if self.appointment_id.is_some() {
            record.appointment_id = self.appointment_id;
        }
        if let Some(visit_date) = self.visit_date {
            record.visit_date = visit_date;
        }
        if let Some(reason) = self.reason {
            record.reason = reason;
        }
        if self.diagnosis.is_some() {
            record.diagnosis = self.diagnosis;
        }
        if self.treatment.is_some() {
            record.treatment = self.treatment;
        }
        if self.observations.is_some() {
            record.observations = self.observations;
        }
        if self.weight.is_some() {
            record.weight = self.weight;
        }
        if self.temperature.is_some() {
            record.temperature = self.temperature;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MedicalRecordFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub pet_id: Option<i32>,
    pub veterinarian_id: Option<i32>,
    pub diagnosis: Option<String>,
    pub visit_from: Option<DateTime<Utc>>,
    pub visit_to: Option<DateTime<Utc>>,
}
