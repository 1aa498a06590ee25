use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::models::treatment::{Treatment, TreatmentStatus};
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTreatmentRequest {
    pub medical_record_id: i32,
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = 100))]
    pub dosage: Option<String>,
    #[validate(length(max = 100))]
    pub frequency: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTreatmentRequest {
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub dosage: Option<String>,
    #[validate(length(max = 100))]
    pub frequency: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl UpdateTreatmentRequest {
    pub fn merge_into(self, treatment: &mut Treatment) {
        if let Some(name) = self.name {
            treatment.name = name;
        }
        if self.dosage.is_some() {
            treatment.dosage = self.dosage;
        }
        if self.frequency.is_some() {
            treatment.frequency = self.frequency;
        }
        if let Some(start_date) = self.start_date {
            treatment.start_date = start_date;
        }
        if self.end_date.is_some() {
            treatment.end_date = self.end_date;
        }
        if self.notes.is_some() {
            treatment.notes = self.notes;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TreatmentFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub medical_record_id: Option<i32>,
    pub status: Option<TreatmentStatus>,
    pub name: Option<String>,
    pub start_from: Option<NaiveDate>,
    pub start_to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_end_before_start_fails_validation() {
        let mut t = Treatment {
            id: 1,
            medical_record_id: 1,
            name: "Amoxicilina".to_string(),
            dosage: Some("250mg".to_string()),
            frequency: Some("cada 12h".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            end_date: None,
            status: TreatmentStatus::Activo,
            notes: None,
        };

        UpdateTreatmentRequest {
            end_date: NaiveDate::from_ymd_opt(2025, 1, 5),
            ..Default::default()
        }
        .merge_into(&mut t);

        assert!(t.validate().is_err());
        assert_eq!(t.dosage.as_deref(), Some("250mg"));
    }
}
