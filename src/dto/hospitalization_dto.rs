use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::hospitalization::{Hospitalization, HospitalizationStatus};
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHospitalizationRequest {
    pub pet_id: i32,
    pub veterinarian_id: i32,
    /// Por defecto, el momento del registro
    pub admission_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub reason: String,
    #[validate(length(max = 2000))]
    pub diagnosis: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateHospitalizationRequest {
    pub admission_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub reason: Option<String>,
    #[validate(length(max = 2000))]
    pub diagnosis: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl UpdateHospitalizationRequest {
    pub fn merge_into(self, hospitalization: &mut Hospitalization) {
        if let Some(admission_date) = self.admission_date {
            hospitalization.admission_date = admission_date;
        }
        if let Some(reason) = self.reason {
            hospitalization.reason = reason;
        }
        if self.diagnosis.is_some() {
            hospitalization.diagnosis = self.diagnosis;
        }
        if self.notes.is_some() {
            hospitalization.notes = self.notes;
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DischargeRequest {
    pub discharge_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HospitalizationFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub pet_id: Option<i32>,
    pub veterinarian_id: Option<i32>,
    pub status: Option<HospitalizationStatus>,
    pub admitted_from: Option<DateTime<Utc>>,
    pub admitted_to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_merge_then_validate_catches_inverted_dates() {
        let admission = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let mut h = Hospitalization {
            id: 1,
            pet_id: 1,
            veterinarian_id: 2,
            admission_date: admission,
            discharge_date: Some(admission + Duration::days(2)),
            reason: "Cirugía".to_string(),
            diagnosis: None,
            notes: None,
            status: HospitalizationStatus::Alta,
        };

        UpdateHospitalizationRequest {
            admission_date: Some(admission + Duration::days(5)),
            ..Default::default()
        }
        .merge_into(&mut h);

        assert!(h.validate().is_err());
    }
}
