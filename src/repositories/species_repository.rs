use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::species_dto::{CreateSpeciesRequest, SpeciesFilters};
use crate::models::species::Species;
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

const DUPLICATE_NAME: &str = "Ya existe una especie con ese nombre";

pub struct SpeciesRepository {
    pool: PgPool,
}

impl SpeciesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateSpeciesRequest) -> Result<Species, AppError> {
        sqlx::query_as::<_, Species>(
            "INSERT INTO species (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(request.name.trim())
        .bind(request.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_NAME))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Species>, AppError> {
        let species = sqlx::query_as::<_, Species>("SELECT * FROM species WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(species)
    }

    pub async fn list(
        &self,
        filters: &SpeciesFilters,
        page: PageRequest,
    ) -> Result<(Vec<Species>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM species");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM species");
        apply_filters(&mut select, filters);
        push_page(&mut select, "name ASC, id ASC", page);
        let species = select.build_query_as::<Species>().fetch_all(&self.pool).await?;

        Ok((species, total))
    }

    pub async fn update(&self, species: &Species) -> Result<Species, AppError> {
        sqlx::query_as::<_, Species>(
            "UPDATE species SET name = $2, description = $3 WHERE id = $1 RETURNING *",
        )
        .bind(species.id)
        .bind(&species.name)
        .bind(&species.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_NAME))
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM species WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, DUPLICATE_NAME))?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &SpeciesFilters) {
    WhereClause::new(builder).contains("name", filters.name.as_deref());
}
