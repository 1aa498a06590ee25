use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::utils::errors::AppError;

db_enum! {
    NotificationKind {
        Cita => "cita",
        Vacuna => "vacuna",
        Hospitalizacion => "hospitalizacion",
        General => "general",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: i32,
    pub person_id: i32,
    pub title: String,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Notificación aún no persistida
impl Notification {
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.is_read {
            return Err(AppError::BadRequest(
                "La notificación ya fue marcada como leída".to_string(),
            ));
        }
        self.is_read = true;
        self.read_at = Some(now);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub person_id: i32,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_read_only_once() {
        let mut n = Notification {
            id: 1,
            person_id: 1,
            title: "Recordatorio".to_string(),
            message: "Vacuna pendiente".to_string(),
            kind: NotificationKind::Vacuna,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };

        let now = Utc::now();
        n.mark_read(now).unwrap();
        assert!(n.is_read);
        assert_eq!(n.read_at, Some(now));

        assert!(matches!(n.mark_read(Utc::now()), Err(AppError::BadRequest(_))));
        assert_eq!(n.read_at, Some(now));
    }
}
