use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::dto::treatment_dto::{CreateTreatmentRequest, TreatmentFilters};
use crate::models::treatment::{Treatment, TreatmentStatus};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

pub struct TreatmentRepository {
    pool: PgPool,
}

impl TreatmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateTreatmentRequest) -> Result<Treatment, AppError> {
        let treatment = sqlx::query_as::<_, Treatment>(
            r#"
            INSERT INTO treatments (medical_record_id, name, dosage, frequency, start_date, end_date, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.medical_record_id)
        .bind(request.name.trim())
        .bind(request.dosage)
        .bind(request.frequency)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(TreatmentStatus::Activo.as_str())
        .bind(request.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(treatment)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Treatment>, AppError> {
        let treatment = sqlx::query_as::<_, Treatment>("SELECT * FROM treatments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(treatment)
    }

    pub async fn list(
        &self,
        filters: &TreatmentFilters,
        page: PageRequest,
    ) -> Result<(Vec<Treatment>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM treatments");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM treatments");
        apply_filters(&mut select, filters);
        push_page(&mut select, "start_date DESC, id DESC", page);
        let treatments = select
            .build_query_as::<Treatment>()
            .fetch_all(&self.pool)
            .await?;

        Ok((treatments, total))
    }

    pub async fn lock(conn: &mut PgConnection, id: i32) -> Result<Option<Treatment>, AppError> {
        let treatment =
            sqlx::query_as::<_, Treatment>("SELECT * FROM treatments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(treatment)
    }

    pub async fn save(conn: &mut PgConnection, treatment: &Treatment) -> Result<Treatment, AppError> {
        let treatment = sqlx::query_as::<_, Treatment>(
            r#"
            UPDATE treatments
            SET name = $2, dosage = $3, frequency = $4, start_date = $5, end_date = $6,
                status = $7, notes = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(treatment.id)
        .bind(&treatment.name)
        .bind(&treatment.dosage)
        .bind(&treatment.frequency)
        .bind(treatment.start_date)
        .bind(treatment.end_date)
        .bind(treatment.status.as_str())
        .bind(&treatment.notes)
        .fetch_one(conn)
        .await?;

        Ok(treatment)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM treatments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &TreatmentFilters) {
    WhereClause::new(builder)
        .eq("medical_record_id", filters.medical_record_id)
        .eq("status", filters.status.map(|s| s.as_str()))
        .contains("name", filters.name.as_deref())
        .between("start_date", filters.start_from, filters.start_to);
}
