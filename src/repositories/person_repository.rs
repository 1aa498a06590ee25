use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::dto::person_dto::{CreatePersonRequest, PersonFilters};
use crate::models::person::{Person, PersonRole};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

const DUPLICATE_DOCUMENT: &str = "Ya existe una persona con ese documento";

pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreatePersonRequest) -> Result<Person, AppError> {
        sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO persons (first_name, last_name, document, email, phone, address, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.document)
        .bind(request.email)
        .bind(request.phone)
        .bind(request.address)
        .bind(request.role.unwrap_or(PersonRole::Cliente).as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_DOCUMENT))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Person>, AppError> {
        let person = sqlx::query_as::<_, Person>("SELECT * FROM persons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(person)
    }

    /// Bloquea la fila de la persona hasta el fin de la transacción.
    pub async fn lock(conn: &mut PgConnection, id: i32) -> Result<Option<Person>, AppError> {
        let person = sqlx::query_as::<_, Person>("SELECT * FROM persons WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(person)
    }

    pub async fn list(
        &self,
        filters: &PersonFilters,
        page: PageRequest,
    ) -> Result<(Vec<Person>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM persons");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM persons");
        apply_filters(&mut select, filters);
        push_page(&mut select, "id DESC", page);
        let persons = select.build_query_as::<Person>().fetch_all(&self.pool).await?;

        Ok((persons, total))
    }

    pub async fn update(&self, person: &Person) -> Result<Person, AppError> {
        sqlx::query_as::<_, Person>(
            r#"
            UPDATE persons
            SET first_name = $2, last_name = $3, document = $4, email = $5,
                phone = $6, address = $7, role = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(person.id)
        .bind(&person.first_name)
        .bind(&person.last_name)
        .bind(&person.document)
        .bind(&person.email)
        .bind(&person.phone)
        .bind(&person.address)
        .bind(person.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_DOCUMENT))
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, DUPLICATE_DOCUMENT))?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &PersonFilters) {
    WhereClause::new(builder)
        .contains("(first_name || ' ' || last_name)", filters.name.as_deref())
        .eq("document", filters.document.clone())
        .contains("email", filters.email.as_deref())
        .eq("role", filters.role.map(|r| r.as_str()));
}
