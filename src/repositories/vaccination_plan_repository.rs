use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::dto::vaccination_dto::VaccinationPlanFilters;
use crate::models::vaccination::{VaccinationPlan, VaccinationPlanStatus};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

pub const ALREADY_ENROLLED: &str = "La mascota ya tiene un plan activo para esta plantilla";

pub struct VaccinationPlanRepository {
    pool: PgPool,
}

impl VaccinationPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// El índice parcial `uq_vaccination_plans_active` respalda la
    /// verificación previa frente a inscripciones concurrentes.
    pub async fn insert(
        conn: &mut PgConnection,
        pet_id: i32,
        template_id: i32,
        status: VaccinationPlanStatus,
        notes: Option<&str>,
    ) -> Result<VaccinationPlan, AppError> {
        sqlx::query_as::<_, VaccinationPlan>(
            r#"
            INSERT INTO vaccination_plans (pet_id, species_vaccination_plan_id, status, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(pet_id)
        .bind(template_id)
        .bind(status.as_str())
        .bind(notes)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::from_constraint(e, ALREADY_ENROLLED))
    }

    pub async fn active_exists(
        conn: &mut PgConnection,
        pet_id: i32,
        template_id: i32,
    ) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM vaccination_plans
                WHERE pet_id = $1 AND species_vaccination_plan_id = $2 AND status = $3
            )
            "#,
        )
        .bind(pet_id)
        .bind(template_id)
        .bind(VaccinationPlanStatus::Activo.as_str())
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<VaccinationPlan>, AppError> {
        let plan = sqlx::query_as::<_, VaccinationPlan>("SELECT * FROM vaccination_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(plan)
    }

    pub async fn lock(conn: &mut PgConnection, id: i32) -> Result<Option<VaccinationPlan>, AppError> {
        let plan = sqlx::query_as::<_, VaccinationPlan>(
            "SELECT * FROM vaccination_plans WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(plan)
    }

    pub async fn list(
        &self,
        filters: &VaccinationPlanFilters,
        page: PageRequest,
    ) -> Result<(Vec<VaccinationPlan>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM vaccination_plans");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM vaccination_plans");
        apply_filters(&mut select, filters);
        push_page(&mut select, "created_at DESC, id DESC", page);
        let plans = select
            .build_query_as::<VaccinationPlan>()
            .fetch_all(&self.pool)
            .await?;

        Ok((plans, total))
    }

    pub async fn save(conn: &mut PgConnection, plan: &VaccinationPlan) -> Result<VaccinationPlan, AppError> {
        sqlx::query_as::<_, VaccinationPlan>(
            "UPDATE vaccination_plans SET status = $2, notes = $3 WHERE id = $1 RETURNING *",
        )
        .bind(plan.id)
        .bind(plan.status.as_str())
        .bind(&plan.notes)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::from_constraint(e, ALREADY_ENROLLED))
    }

    /// Los registros se borran en cascada.
    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vaccination_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &VaccinationPlanFilters) {
    WhereClause::new(builder)
        .eq("pet_id", filters.pet_id)
        .eq("species_vaccination_plan_id", filters.species_vaccination_plan_id)
        .eq("status", filters.status.map(|s| s.as_str()));
}
