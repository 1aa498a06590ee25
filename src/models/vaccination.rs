//! Modelos de vacunación
//!
//! * `SpeciesVaccinationPlan` y `Vaccine`: plantilla de referencia por especie.
//! * `VaccinationPlan`: inscripción de una mascota en una plantilla.
//! * `VaccinationRecord`: una dosis programada o aplicada dentro de un plan.
//!
//! Máquina de estados de un registro:
//!
//! ```text
//! pendiente --apply--> completado   (terminal)
//! pendiente --cancel--> cancelado   (terminal)
//! pendiente --reschedule/toggle--> pendiente
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::errors::AppError;
use crate::utils::validation::append_note;

db_enum! {
    VaccinationPlanStatus {
        Activo => "activo",
        Inactivo => "inactivo",
        Completado => "completado",
    }
}

db_enum! {
    VaccinationRecordStatus {
        Pendiente => "pendiente",
        Completado => "completado",
        Cancelado => "cancelado",
    }
}

impl VaccinationRecordStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completado | Self::Cancelado)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SpeciesVaccinationPlan {
    pub id: i32,
    pub species_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Edad recomendada de inicio, en meses
    pub recommended_age: i32,
}

/// Línea de vacuna de una plantilla
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vaccine {
    pub id: i32,
    pub species_vaccination_plan_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Edad de aplicación en meses
    pub application_age: i32,
    /// Vigencia en meses
    pub validity: i32,
    pub is_mandatory: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VaccinationPlan {
    pub id: i32,
    pub pet_id: i32,
    pub species_vaccination_plan_id: i32,
    #[sqlx(try_from = "String")]
    pub status: VaccinationPlanStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VaccinationPlan {
    /// Cambia entre `activo` e `inactivo`. Una transición sin efecto es un error,
    /// y un plan completado no admite cambios.
    pub fn set_active(&mut self, active: bool) -> Result<(), AppError> {
        let target = if active {
            VaccinationPlanStatus::Activo
        } else {
            VaccinationPlanStatus::Inactivo
        };

        if self.status == VaccinationPlanStatus::Completado {
            return Err(AppError::BadRequest(
                "El plan de vacunación ya está completado".to_string(),
            ));
        }
        if self.status == target {
            return Err(AppError::BadRequest(format!(
                "El plan de vacunación ya está en estado '{}'",
                target
            )));
        }

        self.status = target;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VaccinationRecord {
    pub id: i32,
    pub vaccination_plan_id: i32,
    pub vaccine_id: i32,
    /// Línea de plantilla que originó el registro
    pub plan_vaccine_id: Option<i32>,
    pub enabled: bool,
    pub scheduled_date: DateTime<Utc>,
    pub administered_date: Option<DateTime<Utc>>,
    pub administered_by: Option<i32>,
    pub batch_number: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: VaccinationRecordStatus,
    pub notes: Option<String>,
}

/// Datos de aplicación de una dosis
#[derive(Debug, Clone, Default)]
pub struct Application {
    pub administered_date: Option<DateTime<Utc>>,
    pub administered_by: Option<i32>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
}

impl VaccinationRecord {
    /// Registra la aplicación. Requiere un registro habilitado y pendiente.
    pub fn apply(&mut self, now: DateTime<Utc>, application: Application) -> Result<(), AppError> {
        if !self.enabled {
            return Err(AppError::BadRequest(
                "No se puede aplicar una vacuna deshabilitada".to_string(),
            ));
        }
        if self.status != VaccinationRecordStatus::Pendiente {
            return Err(AppError::BadRequest(format!(
                "Solo se pueden aplicar vacunas pendientes (estado actual: '{}')",
                self.status
            )));
        }

        self.status = VaccinationRecordStatus::Completado;
        self.administered_date = Some(application.administered_date.unwrap_or(now));
        self.administered_by = application.administered_by;
        self.batch_number = application.batch_number;
        if let Some(notes) = application.notes {
            append_note(&mut self.notes, now, &notes);
        }
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>, reason: Option<&str>) -> Result<(), AppError> {
        if self.status.is_terminal() {
            return Err(AppError::BadRequest(format!(
                "La vacuna ya está en estado '{}' y no puede cancelarse",
                self.status
            )));
        }

        self.status = VaccinationRecordStatus::Cancelado;
        let line = match reason {
            Some(reason) => format!("Cancelada: {}", reason),
            None => "Cancelada".to_string(),
        };
        append_note(&mut self.notes, now, &line);
        Ok(())
    }

    pub fn reschedule(&mut self, now: DateTime<Utc>, new_date: DateTime<Utc>) -> Result<(), AppError> {
        if self.status != VaccinationRecordStatus::Pendiente {
            return Err(AppError::BadRequest(format!(
                "Solo se pueden reprogramar vacunas pendientes (estado actual: '{}')",
                self.status
            )));
        }

        let line = format!(
            "Reprogramada de {} a {}",
            self.scheduled_date.format("%Y-%m-%d"),
            new_date.format("%Y-%m-%d")
        );
        self.scheduled_date = new_date;
        append_note(&mut self.notes, now, &line);
        Ok(())
    }

    pub fn toggle_enabled(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.status == VaccinationRecordStatus::Completado {
            return Err(AppError::BadRequest(
                "No se puede habilitar o deshabilitar una vacuna ya aplicada".to_string(),
            ));
        }

        self.enabled = !self.enabled;
        let line = if self.enabled { "Habilitada" } else { "Deshabilitada" };
        append_note(&mut self.notes, now, line);
        Ok(())
    }
}

/// Registro de vacunación aún no persistido
#[derive(Debug, Clone, PartialEq)]
pub struct NewVaccinationRecord {
    pub vaccine_id: i32,
    pub plan_vaccine_id: Option<i32>,
    pub enabled: bool,
    pub scheduled_date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record() -> VaccinationRecord {
        VaccinationRecord {
            id: 1,
            vaccination_plan_id: 1,
            vaccine_id: 10,
            plan_vaccine_id: Some(10),
            enabled: true,
            scheduled_date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            administered_date: None,
            administered_by: None,
            batch_number: None,
            status: VaccinationRecordStatus::Pendiente,
            notes: None,
        }
    }

    fn plan(status: VaccinationPlanStatus) -> VaccinationPlan {
        VaccinationPlan {
            id: 1,
            pet_id: 1,
            species_vaccination_plan_id: 1,
            status,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_defaults_administered_date_to_now() {
        let mut r = record();
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap();
        r.apply(now, Application::default()).unwrap();
        assert_eq!(r.status, VaccinationRecordStatus::Completado);
        assert_eq!(r.administered_date, Some(now));
    }

    #[test]
    fn test_apply_uses_given_date() {
        let mut r = record();
        let given = Utc.with_ymd_and_hms(2025, 2, 28, 16, 0, 0).unwrap();
        r.apply(
            Utc::now(),
            Application {
                administered_date: Some(given),
                administered_by: Some(4),
                batch_number: Some("L-2231".to_string()),
                notes: None,
            },
        )
        .unwrap();
        assert_eq!(r.administered_date, Some(given));
        assert_eq!(r.administered_by, Some(4));
        assert_eq!(r.batch_number.as_deref(), Some("L-2231"));
    }

    #[test]
    fn test_apply_on_disabled_record_is_rejected_for_any_status() {
        for status in [
            VaccinationRecordStatus::Pendiente,
            VaccinationRecordStatus::Completado,
            VaccinationRecordStatus::Cancelado,
        ] {
            let mut r = record();
            r.enabled = false;
            r.status = status;
            assert!(matches!(
                r.apply(Utc::now(), Application::default()),
                Err(AppError::BadRequest(_))
            ));
            assert_eq!(r.status, status);
        }
    }

    #[test]
    fn test_terminal_states_never_change() {
        for terminal in [VaccinationRecordStatus::Completado, VaccinationRecordStatus::Cancelado] {
            let mut r = record();
            r.status = terminal;
            let later = r.scheduled_date + Duration::days(30);

            assert!(r.apply(Utc::now(), Application::default()).is_err());
            assert!(r.cancel(Utc::now(), None).is_err());
            assert!(r.reschedule(Utc::now(), later).is_err());
            assert_eq!(r.status, terminal);
            assert_eq!(r.scheduled_date, record().scheduled_date);
        }
    }

    #[test]
    fn test_cancel_twice_keeps_first_cancellation() {
        let mut r = record();
        r.cancel(Utc::now(), Some("Mascota fallecida")).unwrap();
        let after_first = r.clone();

        assert!(matches!(r.cancel(Utc::now(), None), Err(AppError::BadRequest(_))));
        assert_eq!(r.status, VaccinationRecordStatus::Cancelado);
        assert_eq!(r.notes, after_first.notes);
    }

    #[test]
    fn test_reschedule_logs_old_and_new_date() {
        let mut r = record();
        let new_date = Utc.with_ymd_and_hms(2025, 4, 15, 0, 0, 0).unwrap();
        r.reschedule(Utc::now(), new_date).unwrap();
        assert_eq!(r.scheduled_date, new_date);
        assert!(r.notes.unwrap().contains("Reprogramada de 2025-03-01 a 2025-04-15"));
    }

    #[test]
    fn test_toggle_enabled() {
        let mut r = record();
        r.toggle_enabled(Utc::now()).unwrap();
        assert!(!r.enabled);
        r.toggle_enabled(Utc::now()).unwrap();
        assert!(r.enabled);
        assert_eq!(r.notes.unwrap().lines().count(), 2);
    }

    #[test]
    fn test_toggle_completed_is_rejected() {
        let mut r = record();
        r.apply(Utc::now(), Application::default()).unwrap();
        assert!(r.toggle_enabled(Utc::now()).is_err());
        assert!(r.enabled);
    }

    #[test]
    fn test_toggle_cancelled_is_allowed() {
        let mut r = record();
        r.cancel(Utc::now(), None).unwrap();
        assert!(r.toggle_enabled(Utc::now()).is_ok());
    }

    #[test]
    fn test_plan_activation_rejects_noop() {
        let mut p = plan(VaccinationPlanStatus::Activo);
        assert!(matches!(p.set_active(true), Err(AppError::BadRequest(_))));
        p.set_active(false).unwrap();
        assert_eq!(p.status, VaccinationPlanStatus::Inactivo);
        assert!(p.set_active(false).is_err());
        p.set_active(true).unwrap();
        assert_eq!(p.status, VaccinationPlanStatus::Activo);
    }

    #[test]
    fn test_completed_plan_rejects_status_changes() {
        let mut p = plan(VaccinationPlanStatus::Completado);
        assert!(p.set_active(true).is_err());
        assert!(p.set_active(false).is_err());
        assert_eq!(p.status, VaccinationPlanStatus::Completado);
    }
}
