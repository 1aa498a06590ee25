//! Modelo de Hospitalization

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::errors::AppError;
use crate::utils::validation::{append_note, ensure_datetime_order};

db_enum! {
    HospitalizationStatus {
        Activa => "activa",
        Alta => "alta",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Hospitalization {
    pub id: i32,
    pub pet_id: i32,
    pub veterinarian_id: i32,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: HospitalizationStatus,
}

impl Hospitalization {
    /// Da de alta a la mascota. La fecha de alta no puede ser anterior al ingreso.
    pub fn discharge(
        &mut self,
        now: DateTime<Utc>,
        discharge_date: Option<DateTime<Utc>>,
        notes: Option<&str>,
    ) -> Result<(), AppError> {
        if self.status == HospitalizationStatus::Alta {
            return Err(AppError::BadRequest(
                "La hospitalización ya fue dada de alta".to_string(),
            ));
        }

        let discharge_date = discharge_date.unwrap_or(now);
        ensure_datetime_order(self.admission_date, Some(discharge_date), "la hospitalización")?;

        self.discharge_date = Some(discharge_date);
        self.status = HospitalizationStatus::Alta;
        if let Some(notes) = notes {
            append_note(&mut self.notes, now, notes);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        ensure_datetime_order(self.admission_date, self.discharge_date, "la hospitalización")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn hospitalization() -> Hospitalization {
        Hospitalization {
            id: 7,
            pet_id: 1,
            veterinarian_id: 2,
            admission_date: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            discharge_date: None,
            reason: "Gastroenteritis".to_string(),
            diagnosis: None,
            notes: None,
            status: HospitalizationStatus::Activa,
        }
    }

    #[test]
    fn test_discharge_before_admission_is_rejected() {
        let mut h = hospitalization();
        let early = h.admission_date - Duration::hours(1);
        assert!(matches!(
            h.discharge(Utc::now(), Some(early), None),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(h.status, HospitalizationStatus::Activa);
        assert!(h.discharge_date.is_none());
    }

    #[test]
    fn test_discharge_defaults_to_now() {
        let mut h = hospitalization();
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        h.discharge(now, None, Some("Evolución favorable")).unwrap();
        assert_eq!(h.discharge_date, Some(now));
        assert_eq!(h.status, HospitalizationStatus::Alta);
        assert!(h.notes.unwrap().ends_with("Evolución favorable"));
    }

    #[test]
    fn test_second_discharge_is_rejected() {
        let mut h = hospitalization();
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        h.discharge(now, None, None).unwrap();
        assert!(h.discharge(now, None, None).is_err());
    }
}
