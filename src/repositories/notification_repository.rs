use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::dto::notification_dto::NotificationFilters;
use crate::models::notification::{NewNotification, Notification};
use crate::utils::errors::AppError;
use crate::utils::pagination::PageRequest;
use crate::utils::query::{push_page, WhereClause};

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserta dentro de la transacción que originó el aviso.
    pub async fn insert(conn: &mut PgConnection, notification: &NewNotification) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (person_id, title, message, kind)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(notification.person_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .fetch_one(conn)
        .await?;

        Ok(notification)
    }

    pub async fn create(&self, notification: &NewNotification) -> Result<Notification, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, notification).await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(notification)
    }

    pub async fn list(
        &self,
        filters: &NotificationFilters,
        page: PageRequest,
    ) -> Result<(Vec<Notification>, i64), AppError> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM notifications");
        apply_filters(&mut count, filters);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM notifications");
        apply_filters(&mut select, filters);
        push_page(&mut select, "created_at DESC, id DESC", page);
        let notifications = select
            .build_query_as::<Notification>()
            .fetch_all(&self.pool)
            .await?;

        Ok((notifications, total))
    }

    pub async fn lock(conn: &mut PgConnection, id: i32) -> Result<Option<Notification>, AppError> {
        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(notification)
    }

    pub async fn save(conn: &mut PgConnection, notification: &Notification) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET title = $2, message = $3, kind = $4, is_read = $5, read_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(notification.id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(notification.is_read)
        .bind(notification.read_at)
        .fetch_one(conn)
        .await?;

        Ok(notification)
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &NotificationFilters) {
    WhereClause::new(builder)
        .eq("person_id", filters.person_id)
        .eq("kind", filters.kind.map(|k| k.as_str()))
        .eq("is_read", filters.is_read);
}
