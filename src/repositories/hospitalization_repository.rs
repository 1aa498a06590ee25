use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::dto::hospitalization_dto::HospitalizationFilters;
use crate::models::hospitalization::{Hospitalization, HospitalizationStatus};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

pub const ALREADY_HOSPITALIZED: &str = "La mascota ya tiene una hospitalización activa";

#[derive(Debug, Clone)]
pub struct NewHospitalization {
    pub pet_id: i32,
    pub veterinarian_id: i32,
    pub admission_date: DateTime<Utc>,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
}

pub struct HospitalizationRepository {
    pool: PgPool,
}

impl HospitalizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// El índice parcial `uq_hospitalizations_open` impide dos ingresos
    /// activos de la misma mascota.
    pub async fn create(&self, new: NewHospitalization) -> Result<Hospitalization, AppError> {
        sqlx::query_as::<_, Hospitalization>(
            r#"
            INSERT INTO hospitalizations (pet_id, veterinarian_id, admission_date, reason, diagnosis, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.pet_id)
        .bind(new.veterinarian_id)
        .bind(new.admission_date)
        .bind(new.reason)
        .bind(new.diagnosis)
        .bind(new.notes)
        .bind(HospitalizationStatus::Activa.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, ALREADY_HOSPITALIZED))
    }

    pub async fn active_for_pet(&self, pet_id: i32) -> Result<Option<Hospitalization>, AppError> {
        let hospitalization = sqlx::query_as::<_, Hospitalization>(
            "SELECT * FROM hospitalizations WHERE pet_id = $1 AND status = $2",
        )
        .bind(pet_id)
        .bind(HospitalizationStatus::Activa.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(hospitalization)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Hospitalization>, AppError> {
        let hospitalization =
            sqlx::query_as::<_, Hospitalization>("SELECT * FROM hospitalizations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(hospitalization)
    }

    pub async fn list(
        &self,
        filters: &HospitalizationFilters,
        page: PageRequest,
    ) -> Result<(Vec<Hospitalization>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM hospitalizations");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM hospitalizations");
        apply_filters(&mut select, filters);
        push_page(&mut select, "admission_date DESC, id DESC", page);
        let rows = select
            .build_query_as::<Hospitalization>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn lock(conn: &mut PgConnection, id: i32) -> Result<Option<Hospitalization>, AppError> {
        let hospitalization =
            sqlx::query_as::<_, Hospitalization>("SELECT * FROM hospitalizations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(hospitalization)
    }

    pub async fn save(conn: &mut PgConnection, hospitalization: &Hospitalization) -> Result<Hospitalization, AppError> {
        let hospitalization = sqlx::query_as::<_, Hospitalization>(
            r#"
            UPDATE hospitalizations
            SET admission_date = $2, discharge_date = $3, reason = $4, diagnosis = $5,
                notes = $6, status = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(hospitalization.id)
        .bind(hospitalization.admission_date)
        .bind(hospitalization.discharge_date)
        .bind(&hospitalization.reason)
        .bind(&hospitalization.diagnosis)
        .bind(&hospitalization.notes)
        .bind(hospitalization.status.as_str())
        .fetch_one(conn)
        .await?;

        Ok(hospitalization)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM hospitalizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &HospitalizationFilters) {
    WhereClause::new(builder)
        .eq("pet_id", filters.pet_id)
        .eq("veterinarian_id", filters.veterinarian_id)
        .eq("status", filters.status.map(|s| s.as_str()))
        .between("admission_date", filters.admitted_from, filters.admitted_to);
}
