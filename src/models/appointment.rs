//! Modelo de Appointment
//!
//! Citas de una mascota con un veterinario.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::errors::AppError;
use crate::utils::validation::append_note;

db_enum! {
    AppointmentStatus {
        Pendiente => "pendiente",
        Completada => "completada",
        Cancelada => "cancelada",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Appointment {
    pub id: i32,
    pub pet_id: i32,
    pub veterinarian_id: i32,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub reason: String,
    #[sqlx(try_from = "String")]
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn ends_at(&self) -> DateTime<Utc> {
        slot_end(self.scheduled_at, self.duration_minutes)
    }

    fn ensure_pending(&self, action: &str) -> Result<(), AppError> {
        if self.status != AppointmentStatus::Pendiente {
            return Err(AppError::BadRequest(format!(
                "No se puede {} una cita en estado '{}'",
                action, self.status
            )));
        }
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>, notes: Option<&str>) -> Result<(), AppError> {
        self.ensure_pending("completar")?;
        self.status = AppointmentStatus::Completada;
        if let Some(notes) = notes {
            append_note(&mut self.notes, now, notes);
        }
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>, reason: Option<&str>) -> Result<(), AppError> {
        self.ensure_pending("cancelar")?;
        self.status = AppointmentStatus::Cancelada;
        let line = match reason {
            Some(reason) => format!("Cita cancelada: {}", reason),
            None => "Cita cancelada".to_string(),
        };
        append_note(&mut self.notes, now, &line);
        Ok(())
    }

    pub fn reschedule(&mut self, now: DateTime<Utc>, new_start: DateTime<Utc>) -> Result<(), AppError> {
        self.ensure_pending("reprogramar")?;
        let line = format!(
            "Reprogramada de {} a {}",
            self.scheduled_at.format("%Y-%m-%d %H:%M"),
            new_start.format("%Y-%m-%d %H:%M")
        );
        self.scheduled_at = new_start;
        append_note(&mut self.notes, now, &line);
        Ok(())
    }
}

/// Fin del intervalo semiabierto `[start, start + duration)`
pub fn slot_end(start: DateTime<Utc>, duration_minutes: i32) -> DateTime<Utc> {
    start + Duration::minutes(i64::from(duration_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn appointment() -> Appointment {
        Appointment {
            id: 1,
            pet_id: 1,
            veterinarian_id: 2,
            scheduled_at: Utc.with_ymd_and_hms(2030, 1, 10, 9, 0, 0).unwrap(),
            duration_minutes: 45,
            reason: "Control".to_string(),
            status: AppointmentStatus::Pendiente,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ends_at() {
        let a = appointment();
        assert_eq!(a.ends_at(), Utc.with_ymd_and_hms(2030, 1, 10, 9, 45, 0).unwrap());
    }

    #[test]
    fn test_cancel_twice_is_rejected() {
        let mut a = appointment();
        a.cancel(Utc::now(), Some("El dueño no puede asistir")).unwrap();
        assert_eq!(a.status, AppointmentStatus::Cancelada);
        let notes = a.notes.clone();

        assert!(matches!(a.cancel(Utc::now(), None), Err(AppError::BadRequest(_))));
        assert_eq!(a.notes, notes);
    }

    #[test]
    fn test_completed_cannot_be_rescheduled() {
        let mut a = appointment();
        a.complete(Utc::now(), None).unwrap();
        let new_start = Utc.with_ymd_and_hms(2030, 1, 11, 9, 0, 0).unwrap();
        assert!(a.reschedule(Utc::now(), new_start).is_err());
        assert_eq!(a.scheduled_at, Utc.with_ymd_and_hms(2030, 1, 10, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_reschedule_appends_audit_note() {
        let mut a = appointment();
        let new_start = Utc.with_ymd_and_hms(2030, 1, 11, 15, 30, 0).unwrap();
        a.reschedule(Utc::now(), new_start).unwrap();
        assert_eq!(a.scheduled_at, new_start);
        assert!(a
            .notes
            .unwrap()
            .contains("Reprogramada de 2030-01-10 09:00 a 2030-01-11 15:30"));
    }
}
