use serde::Deserialize;
use validator::Validate;

use crate::models::notification::{Notification, NotificationKind};
use crate::utils::validation::validate_not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    pub person_id: i32,
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub title: String,
    #[validate(length(min = 1, max = 4000), custom = "validate_not_blank")]
    pub message: String,
    pub kind: Option<NotificationKind>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateNotificationRequest {
    #[validate(length(min = 1, max = 150), custom = "validate_not_blank")]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 4000), custom = "validate_not_blank")]
    pub message: Option<String>,
    pub kind: Option<NotificationKind>,
}

impl UpdateNotificationRequest {
    pub fn merge_into(self, notification: &mut Notification) {
        if let Some(title) = self.title {
            notification.title = title;
        }
        if let Some(message) = self.message {
            notification.message = message;
        }
        if let Some(kind) = self.kind {
            notification.kind = kind;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub person_id: Option<i32>,
    pub kind: Option<NotificationKind>,
    pub is_read: Option<bool>,
}
