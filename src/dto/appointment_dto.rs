use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::utils::validation::validate_not_blank;

pub const DEFAULT_DURATION_MINUTES: i32 = 30;

// Request para agendar una cita
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppointmentRequest {
    pub pet_id: i32,
    pub veterinarian_id: i32,
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(min = 5, max = 480))]
    pub duration_minutes: Option<i32>,
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub reason: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// El horario se cambia con `/reschedule`, no por aquí.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAppointmentRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_blank")]
    pub reason: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    pub fn merge_into(self, appointment: &mut Appointment) {
        if let Some(reason) = self.reason {
            appointment.reason = reason;
        }
        if self.notes.is_some() {
            appointment.notes = self.notes;
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteAppointmentRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RescheduleAppointmentRequest {
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(min = 5, max = 480))]
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub pet_id: Option<i32>,
    pub veterinarian_id: Option<i32>,
    pub status: Option<AppointmentStatus>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_out_of_range() {
        let request: CreateAppointmentRequest = serde_json::from_str(
            r#"{"pet_id":1,"veterinarian_id":2,"scheduled_at":"2030-01-01T10:00:00Z","duration_minutes":2,"reason":"Control"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_blank_reason_is_invalid() {
        let request: CreateAppointmentRequest = serde_json::from_str(
            r#"{"pet_id":1,"veterinarian_id":2,"scheduled_at":"2030-01-01T10:00:00Z","reason":"   "}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
        assert_eq!(request.duration_minutes, None);
    }
}
