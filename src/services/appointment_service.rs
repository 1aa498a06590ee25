use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::dto::appointment_dto::{
    AppointmentFilters, CompleteAppointmentRequest, CreateAppointmentRequest,
    RescheduleAppointmentRequest, UpdateAppointmentRequest, DEFAULT_DURATION_MINUTES,
};
use crate::dto::common_dto::CancelRequest;
use crate::models::appointment::{slot_end, Appointment};
use crate::models::notification::{NewNotification, NotificationKind};
use crate::models::pet::Pet;
use crate::repositories::appointment_repository::{AppointmentRepository, NewAppointment};
use crate::repositories::notification_repository::NotificationRepository;
use crate::repositories::person_repository::PersonRepository;
use crate::services::person_service::PersonService;
use crate::services::pet_service::PetService;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/appointments";

fn ensure_future(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<()> {
    if scheduled_at <= now {
        return Err(AppError::BadRequest(
            "La cita debe programarse en el futuro".to_string(),
        ));
    }
    Ok(())
}

/// Bloquea al veterinario y verifica que el horario esté libre. Dos reservas
/// simultáneas del mismo veterinario quedan serializadas por el bloqueo.
async fn ensure_slot_free(
    conn: &mut PgConnection,
    veterinarian_id: i32,
    start: DateTime<Utc>,
    duration_minutes: i32,
    exclude_id: Option<i32>,
) -> AppResult<()> {
    PersonRepository::lock(&mut *conn, veterinarian_id)
        .await?
        .ok_or_else(|| not_found_error("Veterinario", veterinarian_id))?;

    let end = slot_end(start, duration_minutes);
    if AppointmentRepository::overlaps(conn, veterinarian_id, start, end, exclude_id).await? {
        log::warn!(
            "⚠️ Horario ocupado para el veterinario {}: {} - {}",
            veterinarian_id,
            start,
            end
        );
        return Err(AppError::Conflict(
            "El veterinario ya tiene una cita en ese horario".to_string(),
        ));
    }
    Ok(())
}

fn owner_notice(pet: &Pet, title: &str, message: String) -> NewNotification {
    NewNotification {
        person_id: pet.owner_id,
        title: title.to_string(),
        message,
        kind: NotificationKind::Cita,
    }
}

pub struct AppointmentService {
    pool: PgPool,
    repository: AppointmentRepository,
    pets: PetService,
    persons: PersonService,
}

impl AppointmentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: AppointmentRepository::new(pool.clone()),
            pets: PetService::new(pool.clone()),
            persons: PersonService::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, request: CreateAppointmentRequest) -> AppResult<Appointment> {
        request.validate()?;
        let now = Utc::now();
        ensure_future(request.scheduled_at, now)?;

        let pet = self.pets.get(request.pet_id).await?;
        self.persons.require_staff(request.veterinarian_id).await?;

        let new = NewAppointment {
            pet_id: pet.id,
            veterinarian_id: request.veterinarian_id,
            scheduled_at: request.scheduled_at,
            duration_minutes: request.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            reason: request.reason.trim().to_string(),
            notes: request.notes,
        };

        let mut tx = self.pool.begin().await?;
        ensure_slot_free(&mut tx, new.veterinarian_id, new.scheduled_at, new.duration_minutes, None).await?;
        let appointment = AppointmentRepository::insert(&mut tx, &new).await?;
        NotificationRepository::insert(
            &mut tx,
            &owner_notice(
                &pet,
                "Cita programada",
                format!(
                    "Se programó una cita para {} el {}: {}",
                    pet.name,
                    appointment.scheduled_at.format("%Y-%m-%d %H:%M"),
                    appointment.reason
                ),
            ),
        )
        .await?;
        tx.commit().await?;

        log::info!(
            "📅 Cita {} agendada: mascota {} con veterinario {}",
            appointment.id,
            appointment.pet_id,
            appointment.veterinarian_id
        );
        Ok(appointment)
    }

    pub async fn get(&self, id: i32) -> AppResult<Appointment> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Cita", id))
    }

    pub async fn list(&self, filters: AppointmentFilters) -> AppResult<Paginated<Appointment>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (appointments, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(appointments, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdateAppointmentRequest) -> AppResult<Appointment> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut appointment = AppointmentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Cita", id))?;

        request.merge_into(&mut appointment);
        let appointment = AppointmentRepository::save(&mut tx, &appointment).await?;
        tx.commit().await?;
        Ok(appointment)
    }

    pub async fn complete(&self, id: i32, request: CompleteAppointmentRequest) -> AppResult<Appointment> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut appointment = AppointmentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Cita", id))?;

        appointment.complete(Utc::now(), request.notes.as_deref())?;
        let appointment = AppointmentRepository::save(&mut tx, &appointment).await?;
        tx.commit().await?;

        log::info!("✅ Cita {} completada", id);
        Ok(appointment)
    }

    pub async fn cancel(&self, id: i32, request: CancelRequest) -> AppResult<Appointment> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut appointment = AppointmentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Cita", id))?;

        appointment.cancel(Utc::now(), request.reason.as_deref())?;
        let appointment = AppointmentRepository::save(&mut tx, &appointment).await?;

        let pet = self.pets.get(appointment.pet_id).await?;
        NotificationRepository::insert(
            &mut tx,
            &owner_notice(
                &pet,
                "Cita cancelada",
                format!(
                    "La cita de {} del {} fue cancelada",
                    pet.name,
                    appointment.scheduled_at.format("%Y-%m-%d %H:%M")
                ),
            ),
        )
        .await?;
        tx.commit().await?;

        log::info!("🚫 Cita {} cancelada", id);
        Ok(appointment)
    }

    pub async fn reschedule(&self, id: i32, request: RescheduleAppointmentRequest) -> AppResult<Appointment> {
        request.validate()?;
        let now = Utc::now();
        ensure_future(request.scheduled_at, now)?;

        let mut tx = self.pool.begin().await?;
        let mut appointment = AppointmentRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Cita", id))?;

        appointment.reschedule(now, request.scheduled_at)?;
        if let Some(duration) = request.duration_minutes {
            appointment.duration_minutes = duration;
        }

        ensure_slot_free(
            &mut tx,
            appointment.veterinarian_id,
            appointment.scheduled_at,
            appointment.duration_minutes,
            Some(appointment.id),
        )
        .await?;
        let appointment = AppointmentRepository::save(&mut tx, &appointment).await?;
        tx.commit().await?;

        log::info!(
            "🔄 Cita {} reprogramada: {} a {}",
            id,
            appointment.scheduled_at,
            appointment.ends_at()
        );
        Ok(appointment)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Cita", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_past_or_present_slots_are_rejected() {
        let now = Utc::now();
        assert!(ensure_future(now + Duration::minutes(1), now).is_ok());
        assert!(matches!(ensure_future(now, now), Err(AppError::BadRequest(_))));
        assert!(ensure_future(now - Duration::days(1), now).is_err());
    }
}
