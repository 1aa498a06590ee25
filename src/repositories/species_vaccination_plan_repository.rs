use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::vaccination_dto::{
    CreateSpeciesVaccinationPlanRequest, CreateVaccineRequest, SpeciesVaccinationPlanFilters,
};
use crate::models::vaccination::{SpeciesVaccinationPlan, Vaccine};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

const DUPLICATE_TEMPLATE: &str = "Ya existe una plantilla con ese nombre para la especie";
const TEMPLATE_IN_USE: &str = "La plantilla está en uso por planes de vacunación";
const VACCINE_IN_USE: &str = "La vacuna tiene registros de vacunación asociados";

/// Plantillas de vacunación por especie y sus líneas de vacuna
pub struct SpeciesVaccinationPlanRepository {
    pool: PgPool,
}

impl SpeciesVaccinationPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        request: CreateSpeciesVaccinationPlanRequest,
    ) -> Result<SpeciesVaccinationPlan, AppError> {
        sqlx::query_as::<_, SpeciesVaccinationPlan>(
            r#"
            INSERT INTO species_vaccination_plans (species_id, name, description, recommended_age)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.species_id)
        .bind(request.name.trim())
        .bind(request.description)
        .bind(request.recommended_age.unwrap_or(0))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_TEMPLATE))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<SpeciesVaccinationPlan>, AppError> {
        let template = sqlx::query_as::<_, SpeciesVaccinationPlan>(
            "SELECT * FROM species_vaccination_plans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    pub async fn list(
        &self,
        filters: &SpeciesVaccinationPlanFilters,
        page: PageRequest,
    ) -> Result<(Vec<SpeciesVaccinationPlan>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM species_vaccination_plans");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM species_vaccination_plans");
        apply_filters(&mut select, filters);
        push_page(&mut select, "name ASC, id ASC", page);
        let templates = select
            .build_query_as::<SpeciesVaccinationPlan>()
            .fetch_all(&self.pool)
            .await?;

        Ok((templates, total))
    }

    pub async fn update(&self, template: &SpeciesVaccinationPlan) -> Result<SpeciesVaccinationPlan, AppError> {
        sqlx::query_as::<_, SpeciesVaccinationPlan>(
            r#"
            UPDATE species_vaccination_plans
            SET name = $2, description = $3, recommended_age = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(template.id)
        .bind(&template.name)
        .bind(&template.description)
        .bind(template.recommended_age)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_TEMPLATE))
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM species_vaccination_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, TEMPLATE_IN_USE))?;

        Ok(result.rows_affected() > 0)
    }

    // Vacunas de la plantilla

    /// Líneas en orden de aplicación.
    pub async fn vaccines(&self, template_id: i32) -> Result<Vec<Vaccine>, AppError> {
        let vaccines = sqlx::query_as::<_, Vaccine>(
            r#"
            SELECT * FROM vaccines
            WHERE species_vaccination_plan_id = $1
            ORDER BY application_age ASC, id ASC
            "#,
        )
        .bind(template_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vaccines)
    }

    pub async fn vaccines_by_ids(&self, ids: &[i32]) -> Result<Vec<Vaccine>, AppError> {
        let vaccines = sqlx::query_as::<_, Vaccine>("SELECT * FROM vaccines WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(vaccines)
    }

    pub async fn find_vaccine(&self, id: i32) -> Result<Option<Vaccine>, AppError> {
        let vaccine = sqlx::query_as::<_, Vaccine>("SELECT * FROM vaccines WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vaccine)
    }

    pub async fn create_vaccine(
        &self,
        template_id: i32,
        request: CreateVaccineRequest,
    ) -> Result<Vaccine, AppError> {
        let vaccine = sqlx::query_as::<_, Vaccine>(
            r#"
            INSERT INTO vaccines (species_vaccination_plan_id, name, description, application_age, validity, is_mandatory)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(template_id)
        .bind(request.name.trim())
        .bind(request.description)
        .bind(request.application_age)
        .bind(request.validity)
        .bind(request.is_mandatory.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;

        Ok(vaccine)
    }

    pub async fn update_vaccine(&self, vaccine: &Vaccine) -> Result<Vaccine, AppError> {
        let vaccine = sqlx::query_as::<_, Vaccine>(
            r#"
            UPDATE vaccines
            SET name = $2, description = $3, application_age = $4, validity = $5, is_mandatory = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(vaccine.id)
        .bind(&vaccine.name)
        .bind(&vaccine.description)
        .bind(vaccine.application_age)
        .bind(vaccine.validity)
        .bind(vaccine.is_mandatory)
        .fetch_one(&self.pool)
        .await?;

        Ok(vaccine)
    }

    pub async fn delete_vaccine(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vaccines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, VACCINE_IN_USE))?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &SpeciesVaccinationPlanFilters) {
    WhereClause::new(builder)
        .eq("species_id", filters.species_id)
        .contains("name", filters.name.as_deref());
}
