use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::dto::vaccination_dto::VaccinationRecordFilters;
use crate::models::vaccination::{NewVaccinationRecord, VaccinationRecord, VaccinationRecordStatus};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

pub const DUPLICATE_PENDING: &str = "Ya existe un registro pendiente de esa vacuna en el plan";

/// Conteo de registros de un plan por estado
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct RecordTally {
    pub pending: i64,
    pub completed: i64,
}

impl RecordTally {
    /// Un plan termina cuando no quedan dosis pendientes y al menos una fue aplicada.
    pub fn plan_finished(&self) -> bool {
        self.pending == 0 && self.completed > 0
    }
}

pub struct VaccinationRecordRepository {
    pool: PgPool,
}

impl VaccinationRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        conn: &mut PgConnection,
        plan_id: i32,
        record: &NewVaccinationRecord,
    ) -> Result<VaccinationRecord, AppError> {
        sqlx::query_as::<_, VaccinationRecord>(
            r#"
            INSERT INTO vaccination_records
                (vaccination_plan_id, vaccine_id, plan_vaccine_id, enabled, scheduled_date, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(plan_id)
        .bind(record.vaccine_id)
        .bind(record.plan_vaccine_id)
        .bind(record.enabled)
        .bind(record.scheduled_date)
        .bind(VaccinationRecordStatus::Pendiente.as_str())
        .bind(&record.notes)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_PENDING))
    }

    pub async fn pending_exists(
        conn: &mut PgConnection,
        plan_id: i32,
        vaccine_id: i32,
    ) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM vaccination_records
                WHERE vaccination_plan_id = $1 AND vaccine_id = $2 AND status = $3
            )
            "#,
        )
        .bind(plan_id)
        .bind(vaccine_id)
        .bind(VaccinationRecordStatus::Pendiente.as_str())
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    pub async fn tally(conn: &mut PgConnection, plan_id: i32) -> Result<RecordTally, AppError> {
        let tally = sqlx::query_as::<_, RecordTally>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'pendiente') AS pending,
                COUNT(*) FILTER (WHERE status = 'completado') AS completed
            FROM vaccination_records
            WHERE vaccination_plan_id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_one(conn)
        .await?;

        Ok(tally)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<VaccinationRecord>, AppError> {
        let record =
            sqlx::query_as::<_, VaccinationRecord>("SELECT * FROM vaccination_records WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record)
    }

    pub async fn lock(conn: &mut PgConnection, id: i32) -> Result<Option<VaccinationRecord>, AppError> {
        let record = sqlx::query_as::<_, VaccinationRecord>(
            "SELECT * FROM vaccination_records WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(record)
    }

    pub async fn for_plan(&self, plan_id: i32) -> Result<Vec<VaccinationRecord>, AppError> {
        let records = sqlx::query_as::<_, VaccinationRecord>(
            r#"
            SELECT * FROM vaccination_records
            WHERE vaccination_plan_id = $1
            ORDER BY scheduled_date ASC, id ASC
            "#,
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    pub async fn list(
        &self,
        filters: &VaccinationRecordFilters,
        page: PageRequest,
    ) -> Result<(Vec<VaccinationRecord>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM vaccination_records");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM vaccination_records");
        apply_filters(&mut select, filters);
        push_page(&mut select, "scheduled_date ASC, id ASC", page);
        let records = select
            .build_query_as::<VaccinationRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    pub async fn save(conn: &mut PgConnection, record: &VaccinationRecord) -> Result<VaccinationRecord, AppError> {
        sqlx::query_as::<_, VaccinationRecord>(
            r#"
            UPDATE vaccination_records
            SET enabled = $2, scheduled_date = $3, administered_date = $4, administered_by = $5,
                batch_number = $6, status = $7, notes = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.enabled)
        .bind(record.scheduled_date)
        .bind(record.administered_date)
        .bind(record.administered_by)
        .bind(&record.batch_number)
        .bind(record.status.as_str())
        .bind(&record.notes)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_PENDING))
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &VaccinationRecordFilters) {
    WhereClause::new(builder)
        .eq("vaccination_plan_id", filters.vaccination_plan_id)
        .eq("vaccine_id", filters.vaccine_id)
        .eq("status", filters.status.map(|s| s.as_str()))
        .eq("enabled", filters.enabled)
        .between("scheduled_date", filters.scheduled_from, filters.scheduled_to);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_finished_needs_an_applied_dose() {
        assert!(RecordTally { pending: 0, completed: 2 }.plan_finished());
        assert!(!RecordTally { pending: 1, completed: 2 }.plan_finished());
        // todo cancelado: no se marca como completado
        assert!(!RecordTally { pending: 0, completed: 0 }.plan_finished());
    }
}
