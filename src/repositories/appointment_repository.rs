use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::dto::appointment_dto::AppointmentFilters;
use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

/// Datos de una cita nueva, ya validados.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub pet_id: i32,
    pub veterinarian_id: i32,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub reason: String,
    pub notes: Option<String>,
}

pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(conn: &mut PgConnection, appointment: &NewAppointment) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (pet_id, veterinarian_id, scheduled_at, duration_minutes, reason, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(appointment.pet_id)
        .bind(appointment.veterinarian_id)
        .bind(appointment.scheduled_at)
        .bind(appointment.duration_minutes)
        .bind(&appointment.reason)
        .bind(AppointmentStatus::Pendiente.as_str())
        .bind(&appointment.notes)
        .fetch_one(conn)
        .await?;

        Ok(appointment)
    }

    /// ¿El veterinario tiene otra cita no cancelada que se cruce con
    /// `[start, end)`?
    pub async fn overlaps(
        conn: &mut PgConnection,
        veterinarian_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM appointments
                WHERE veterinarian_id = $1
                  AND status <> $2
                  AND ($5::INTEGER IS NULL OR id <> $5)
                  AND scheduled_at < $4
                  AND scheduled_at + make_interval(mins => duration_minutes) > $3
            )
            "#,
        )
        .bind(veterinarian_id)
        .bind(AppointmentStatus::Cancelada.as_str())
        .bind(start)
        .bind(end)
        .bind(exclude_id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Appointment>, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(appointment)
    }

    pub async fn lock(conn: &mut PgConnection, id: i32) -> Result<Option<Appointment>, AppError> {
        let appointment =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(appointment)
    }

    pub async fn list(
        &self,
        filters: &AppointmentFilters,
        page: PageRequest,
    ) -> Result<(Vec<Appointment>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM appointments");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM appointments");
        apply_filters(&mut select, filters);
        push_page(&mut select, "scheduled_at DESC, id DESC", page);
        let appointments = select
            .build_query_as::<Appointment>()
            .fetch_all(&self.pool)
            .await?;

        Ok((appointments, total))
    }

    pub async fn save(conn: &mut PgConnection, appointment: &Appointment) -> Result<Appointment, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET scheduled_at = $2, duration_minutes = $3, reason = $4, status = $5, notes = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(appointment.id)
        .bind(appointment.scheduled_at)
        .bind(appointment.duration_minutes)
        .bind(&appointment.reason)
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .fetch_one(conn)
        .await?;

        Ok(appointment)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &AppointmentFilters) {
    WhereClause::new(builder)
        .eq("pet_id", filters.pet_id)
        .eq("veterinarian_id", filters.veterinarian_id)
        .eq("status", filters.status.map(|s| s.as_str()))
        .between("scheduled_at", filters.date_from, filters.date_to);
}
