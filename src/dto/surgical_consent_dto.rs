use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::surgical_consent::{ConsentStatus, SurgicalConsent};
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSurgicalConsentRequest {
    pub pet_id: i32,
    pub owner_id: i32,
    pub veterinarian_id: i32,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub procedure: String,
    #[validate(length(max = 4000))]
    pub risks: Option<String>,
    pub surgery_date: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSurgicalConsentRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub procedure: Option<String>,
    #[validate(length(max = 4000))]
    pub risks: Option<String>,
    pub surgery_date: Option<DateTime<Utc>>,
}

impl UpdateSurgicalConsentRequest {
    pub fn merge_into(self, consent: &mut SurgicalConsent) {
        if let Some(procedure) = self.procedure {
            consent.procedure = procedure;
        }
        if self.risks.is_some() {
            consent.risks = self.risks;
        }
        if let Some(surgery_date) = self.surgery_date {
            consent.surgery_date = surgery_date;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SurgicalConsentFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub pet_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub status: Option<ConsentStatus>,
    pub surgery_from: Option<DateTime<Utc>>,
    pub surgery_to: Option<DateTime<Utc>>,
}
