use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::dto::surgical_consent_dto::{CreateSurgicalConsentRequest, SurgicalConsentFilters};
use crate::models::surgical_consent::{ConsentStatus, SurgicalConsent};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

pub struct SurgicalConsentRepository {
    pool: PgPool,
}

impl SurgicalConsentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateSurgicalConsentRequest) -> Result<SurgicalConsent, AppError> {
        let consent = sqlx::query_as::<_, SurgicalConsent>(
            r#"
            INSERT INTO surgical_consents (pet_id, owner_id, veterinarian_id, procedure, risks, surgery_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.pet_id)
        .bind(request.owner_id)
        .bind(request.veterinarian_id)
        .bind(request.procedure.trim())
        .bind(request.risks)
        .bind(request.surgery_date)
        .bind(ConsentStatus::Pendiente.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(consent)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<SurgicalConsent>, AppError> {
        let consent =
            sqlx::query_as::<_, SurgicalConsent>("SELECT * FROM surgical_consents WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(consent)
    }

    pub async fn lock(conn: &mut PgConnection, id: i32) -> Result<Option<SurgicalConsent>, AppError> {
        let consent = sqlx::query_as::<_, SurgicalConsent>(
            "SELECT * FROM surgical_consents WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(consent)
    }

    pub async fn list(
        &self,
        filters: &SurgicalConsentFilters,
        page: PageRequest,
    ) -> Result<(Vec<SurgicalConsent>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM surgical_consents");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM surgical_consents");
        apply_filters(&mut select, filters);
        push_page(&mut select, "id DESC", page);
        let consents = select
            .build_query_as::<SurgicalConsent>()
            .fetch_all(&self.pool)
            .await?;

        Ok((consents, total))
    }

    pub async fn save(conn: &mut PgConnection, consent: &SurgicalConsent) -> Result<SurgicalConsent, AppError> {
        let consent = sqlx::query_as::<_, SurgicalConsent>(
            r#"
            UPDATE surgical_consents
            SET procedure = $2, risks = $3, surgery_date = $4, status = $5,
                document_url = $6, signed_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(consent.id)
        .bind(&consent.procedure)
        .bind(&consent.risks)
        .bind(consent.surgery_date)
        .bind(consent.status.as_str())
        .bind(&consent.document_url)
        .bind(consent.signed_at)
        .fetch_one(conn)
        .await?;

        Ok(consent)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM surgical_consents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &SurgicalConsentFilters) {
    WhereClause::new(builder)
        .eq("pet_id", filters.pet_id)
        .eq("owner_id", filters.owner_id)
        .eq("status", filters.status.map(|s| s.as_str()))
        .between("surgery_date", filters.surgery_from, filters.surgery_to);
}
