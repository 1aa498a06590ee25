//! Programación de vacunas al inscribir una mascota en un plan
//!
//! Para cada línea de la plantilla se compara la edad de la mascota (meses)
//! con la edad de aplicación de la vacuna:
//!
//! * todavía no corresponde: se programa para cuando la mascota alcance la edad;
//! * vencida y obligatoria: recuperación urgente;
//! * vencida y opcional: recuperación normal, y se deshabilita si el atraso
//!   supera el umbral de la política.

use chrono::{DateTime, Duration, Months, Utc};

use crate::config::VaccinationSchedulePolicy;
use crate::models::vaccination::{NewVaccinationRecord, SpeciesVaccinationPlan, Vaccine};
use crate::utils::errors::AppError;

pub fn schedule_vaccine(
    policy: &VaccinationSchedulePolicy,
    pet_age_months: i32,
    vaccine: &Vaccine,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, bool), AppError> {
    if pet_age_months < vaccine.application_age {
        let months_left = (vaccine.application_age - pet_age_months) as u32;
        let date = now.checked_add_months(Months::new(months_left)).ok_or_else(|| {
            AppError::Internal(format!("Fecha fuera de rango para la vacuna {}", vaccine.id))
        })?;
        return Ok((date, true));
    }

    if vaccine.is_mandatory {
        return Ok((now + Duration::days(policy.mandatory_catch_up_days), true));
    }

    let overdue_months = pet_age_months - vaccine.application_age;
    let enabled = overdue_months <= policy.optional_stale_months;
    Ok((now + Duration::days(policy.optional_catch_up_days), enabled))
}

/// Clona cada línea de la plantilla en un registro pendiente.
pub fn clone_template(
    policy: &VaccinationSchedulePolicy,
    template: &SpeciesVaccinationPlan,
    vaccines: &[Vaccine],
    pet_age_months: i32,
    now: DateTime<Utc>,
) -> Result<Vec<NewVaccinationRecord>, AppError> {
    vaccines
        .iter()
        .map(|vaccine| {
            let (scheduled_date, enabled) = schedule_vaccine(policy, pet_age_months, vaccine, now)?;
            let mut note = format!(
                "Generada desde la plantilla '{}' (vacuna '{}', aplicación a los {} meses)",
                template.name, vaccine.name, vaccine.application_age
            );
            if !enabled {
                note.push_str("; deshabilitada por atraso");
            }

            Ok(NewVaccinationRecord {
                vaccine_id: vaccine.id,
                plan_vaccine_id: Some(vaccine.id),
                enabled,
                scheduled_date,
                notes: Some(note),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn vaccine(id: i32, application_age: i32, is_mandatory: bool) -> Vaccine {
        Vaccine {
            id,
            species_vaccination_plan_id: 1,
            name: format!("Vacuna {}", id),
            description: None,
            application_age,
            validity: 12,
            is_mandatory,
        }
    }

    fn template() -> SpeciesVaccinationPlan {
        SpeciesVaccinationPlan {
            id: 1,
            species_id: 1,
            name: "Plan canino básico".to_string(),
            description: None,
            recommended_age: 2,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_not_yet_due_is_scheduled_by_age_difference() {
        let policy = VaccinationSchedulePolicy::default();
        let (date, enabled) = schedule_vaccine(&policy, 1, &vaccine(1, 4, true), now()).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 4, 15, 12, 0, 0).unwrap());
        assert!(enabled);
    }

    #[test]
    fn test_mandatory_due_now_is_urgent() {
        // mascota de 2 meses, vacuna obligatoria a los 2 meses
        let policy = VaccinationSchedulePolicy::default();
        let (date, enabled) = schedule_vaccine(&policy, 2, &vaccine(1, 2, true), now()).unwrap();
        assert_eq!(date, now() + Duration::days(7));
        assert!(enabled);
    }

    #[test]
    fn test_stale_optional_is_disabled() {
        // 8 meses, opcional a 1 mes: 7 meses de atraso > 6
        let policy = VaccinationSchedulePolicy::default();
        let (date, enabled) = schedule_vaccine(&policy, 8, &vaccine(1, 1, false), now()).unwrap();
        assert_eq!(date, now() + Duration::days(14));
        assert!(!enabled);
    }

    #[test]
    fn test_optional_at_threshold_stays_enabled() {
        let policy = VaccinationSchedulePolicy::default();
        let (_, enabled) = schedule_vaccine(&policy, 7, &vaccine(1, 1, false), now()).unwrap();
        assert!(enabled);
    }

    #[test]
    fn test_policy_threshold_is_configurable() {
        let policy = VaccinationSchedulePolicy {
            optional_stale_months: 12,
            ..Default::default()
        };
        let (_, enabled) = schedule_vaccine(&policy, 8, &vaccine(1, 1, false), now()).unwrap();
        assert!(enabled);
    }

    #[test]
    fn test_clone_produces_one_record_per_line() {
        let policy = VaccinationSchedulePolicy::default();
        let vaccines = vec![vaccine(1, 2, true), vaccine(2, 6, true), vaccine(3, 1, false)];

        let records = clone_template(&policy, &template(), &vaccines, 8, now()).unwrap();

        assert_eq!(records.len(), vaccines.len());
        assert_eq!(
            records.iter().map(|r| r.vaccine_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(records.iter().all(|r| r.plan_vaccine_id == Some(r.vaccine_id)));
        assert_eq!(records[0].scheduled_date, now() + Duration::days(7));
        assert_eq!(records[1].scheduled_date, now() + Duration::days(7));
        assert_eq!(records[2].scheduled_date, now() + Duration::days(14));
        assert!(!records[2].enabled);
        assert!(records[2].notes.as_deref().unwrap().contains("Plan canino básico"));
    }

    #[test]
    fn test_clone_empty_template() {
        let policy = VaccinationSchedulePolicy::default();
        let records = clone_template(&policy, &template(), &[], 3, now()).unwrap();
        assert!(records.is_empty());
    }
}
