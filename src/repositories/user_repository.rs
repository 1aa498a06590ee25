use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::dto::user_dto::UserFilters;
use crate::models::user::{User, UserRole, UserWithPerson};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

const DUPLICATE_USERNAME: &str = "El nombre de usuario ya está registrado";

const SELECT_WITH_PERSON: &str = r#"
    SELECT u.id, u.username, u.password_hash, u.person_id, u.role, u.is_active, u.created_at,
           p.first_name, p.last_name
    FROM users u
    JOIN persons p ON p.id = u.person_id
"#;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        person_id: i32,
        role: UserRole,
        is_active: bool,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, person_id, role, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(person_id)
        .bind(role.as_str())
        .bind(is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, DUPLICATE_USERNAME))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<UserWithPerson>, AppError> {
        let user = sqlx::query_as::<_, UserWithPerson>(&format!("{} WHERE u.id = $1", SELECT_WITH_PERSON))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserWithPerson>, AppError> {
        let user = sqlx::query_as::<_, UserWithPerson>(&format!(
            "{} WHERE u.username = $1",
            SELECT_WITH_PERSON
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn list(
        &self,
        filters: &UserFilters,
        page: PageRequest,
    ) -> Result<(Vec<UserWithPerson>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users u");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(SELECT_WITH_PERSON);
        apply_filters(&mut select, filters);
        push_page(&mut select, "u.id DESC", page);
        let users = select
            .build_query_as::<UserWithPerson>()
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total))
    }

    pub async fn update(&self, user: &User) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2, role = $3, is_active = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &UserFilters) {
    WhereClause::new(builder)
        .contains("u.username", filters.username.as_deref())
        .eq("u.role", filters.role.map(|r| r.as_str()))
        .eq("u.person_id", filters.person_id)
        .eq("u.is_active", filters.is_active);
}
