//! Modelo de Treatment

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::errors::AppError;
use crate::utils::validation::{append_note, ensure_date_order};

db_enum! {
    TreatmentStatus {
        Activo => "activo",
        Completado => "completado",
        Cancelado => "cancelado",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Treatment {
    pub id: i32,
    pub medical_record_id: i32,
    pub name: String,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: TreatmentStatus,
    pub notes: Option<String>,
}

impl Treatment {
    pub fn validate(&self) -> Result<(), AppError> {
        ensure_date_order(self.start_date, self.end_date, "el tratamiento")
    }

    fn ensure_active(&self) -> Result<(), AppError> {
        if self.status != TreatmentStatus::Activo {
            return Err(AppError::BadRequest(format!(
                "El tratamiento ya está en estado '{}'",
                self.status
            )));
        }
        Ok(())
    }

    /// Cierra el tratamiento; si no tenía fecha de fin se usa la de hoy.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        self.ensure_active()?;
        let today = now.date_naive();
        let end = self.end_date.unwrap_or(today.max(self.start_date));
        self.end_date = Some(end);
        self.status = TreatmentStatus::Completado;
        self.validate()
    }

    pub fn cancel(&mut self, now: DateTime<Utc>, reason: Option<&str>) -> Result<(), AppError> {
        self.ensure_active()?;
        self.status = TreatmentStatus::Cancelado;
        let line = match reason {
            Some(reason) => format!("Tratamiento cancelado: {}", reason),
            None => "Tratamiento cancelado".to_string(),
        };
        append_note(&mut self.notes, now, &line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn treatment() -> Treatment {
        Treatment {
            id: 1,
            medical_record_id: 1,
            name: "Amoxicilina".to_string(),
            dosage: Some("250 mg".to_string()),
            frequency: Some("cada 12 horas".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end_date: None,
            status: TreatmentStatus::Activo,
            notes: None,
        }
    }

    #[test]
    fn test_complete_sets_end_date() {
        let mut t = treatment();
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 10, 0, 0).unwrap();
        t.complete(now).unwrap();
        assert_eq!(t.status, TreatmentStatus::Completado);
        assert_eq!(t.end_date, NaiveDate::from_ymd_opt(2024, 2, 10));
    }

    #[test]
    fn test_cancelled_treatment_cannot_complete() {
        let mut t = treatment();
        t.cancel(Utc::now(), None).unwrap();
        assert!(matches!(t.complete(Utc::now()), Err(AppError::BadRequest(_))));
        assert_eq!(t.status, TreatmentStatus::Cancelado);
    }
}
