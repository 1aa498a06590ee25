use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::dto::notification_dto::{
    CreateNotificationRequest, NotificationFilters, UpdateNotificationRequest,
};
use crate::models::notification::{NewNotification, Notification, NotificationKind};
use crate::repositories::notification_repository::NotificationRepository;
use crate::services::person_service::PersonService;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::pagination::{PageRequest, Paginated};

const LIST_PATH: &str = "/api/notifications";

pub struct NotificationService {
    pool: PgPool,
    repository: NotificationRepository,
    persons: PersonService,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: NotificationRepository::new(pool.clone()),
            persons: PersonService::new(pool.clone()),
            pool,
        }
    }

    pub async fn create(&self, request: CreateNotificationRequest) -> AppResult<Notification> {
        request.validate()?;
        self.persons.get(request.person_id).await?;

        self.repository
            .create(&NewNotification {
                person_id: request.person_id,
                title: request.title.trim().to_string(),
                message: request.message,
                kind: request.kind.unwrap_or(NotificationKind::General),
            })
            .await
    }

    pub async fn get(&self, id: i32) -> AppResult<Notification> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Notificación", id))
    }

    pub async fn list(&self, filters: NotificationFilters) -> AppResult<Paginated<Notification>> {
        let page = PageRequest::new(filters.page, filters.per_page)?;
        let (notifications, total) = self.repository.list(&filters, page).await?;
        Ok(Paginated::new(notifications, total, page, LIST_PATH))
    }

    pub async fn update(&self, id: i32, request: UpdateNotificationRequest) -> AppResult<Notification> {
        request.validate()?;
        let mut tx = self.pool.begin().await?;
        let mut notification = NotificationRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Notificación", id))?;

        request.merge_into(&mut notification);
        let notification = NotificationRepository::save(&mut tx, &notification).await?;
        tx.commit().await?;
        Ok(notification)
    }

    pub async fn mark_read(&self, id: i32) -> AppResult<Notification> {
        let mut tx = self.pool.begin().await?;
        let mut notification = NotificationRepository::lock(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Notificación", id))?;

        notification.mark_read(Utc::now())?;
        let notification = NotificationRepository::save(&mut tx, &notification).await?;
        tx.commit().await?;
        Ok(notification)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Notificación", id));
        }
        Ok(())
    }
}
