use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::medical_record_dto::MedicalRecordFilters;
use crate::models::medical_record::MedicalRecord;
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

const HAS_TREATMENTS: &str = "La historia clínica tiene tratamientos asociados";

#[derive(Debug, Clone)]
pub struct NewMedicalRecord {
    pub pet_id: i32,
    pub veterinarian_id: i32,
    pub appointment_id: Option<i32>,
    pub visit_date: DateTime<Utc>,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub observations: Option<String>,
    pub weight: Option<Decimal>,
    pub temperature: Option<Decimal>,
}

pub struct MedicalRecordRepository {
    pool: PgPool,
}

impl MedicalRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewMedicalRecord) -> Result<MedicalRecord, AppError> {
        let record = sqlx::query_as::<_, MedicalRecord>(
            r#"
            INSERT INTO medical_records
                (pet_id, veterinarian_id, appointment_id, visit_date, reason, diagnosis,
                 treatment, observations, weight, temperature)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new.pet_id)
        .bind(new.veterinarian_id)
        .bind(new.appointment_id)
        .bind(new.visit_date)
        .bind(new.reason)
        .bind(new.diagnosis)
        .bind(new.treatment)
        .bind(new.observations)
        .bind(new.weight)
        .bind(new.temperature)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<MedicalRecord>, AppError> {
        let record = sqlx::query_as::<_, MedicalRecord>("SELECT * FROM medical_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn list(
        &self,
        filters: &MedicalRecordFilters,
        page: PageRequest,
    ) -> Result<(Vec<MedicalRecord>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM medical_records");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM medical_records");
        apply_filters(&mut select, filters);
        push_page(&mut select, "visit_date DESC, id DESC", page);
        let records = select
            .build_query_as::<MedicalRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    pub async fn update(&self, record: &MedicalRecord) -> Result<MedicalRecord, AppError> {
        let record = sqlx::query_as::<_, MedicalRecord>(
            r#"
            UPDATE medical_records
            SET appointment_id = $2, visit_date = $3, reason = $4, diagnosis = $5,
                treatment = $6, observations = $7, weight = $8, temperature = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.appointment_id)
        .bind(record.visit_date)
        .bind(&record.reason)
        .bind(&record.diagnosis)
        .bind(&record.treatment)
        .bind(&record.observations)
        .bind(record.weight)
        .bind(record.temperature)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM medical_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, HAS_TREATMENTS))?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &MedicalRecordFilters) {
    WhereClause::new(builder)
        .eq("pet_id", filters.pet_id)
        .eq("veterinarian_id", filters.veterinarian_id)
        .contains("diagnosis", filters.diagnosis.as_deref())
        .between("visit_date", filters.visit_from, filters.visit_to);
}
