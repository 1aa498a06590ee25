use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{User, UserRole, UserWithPerson};
use crate::utils::validation::validate_not_blank;

// Request para crear un usuario
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50), custom = "validate_not_blank")]
    pub username: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    pub person_id: i32,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

// Request para actualizar un usuario
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    /// Aplica los campos presentes; la contraseña se trata aparte porque
    /// hay que hashearla.
    pub fn merge_into(&self, user: &mut User) {
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserFilters {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub username: Option<String>,
    pub role: Option<UserRole>,
    pub person_id: Option<i32>,
    pub is_active: Option<bool>,
}

// Response de usuario (sin password)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub person_id: i32,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserWithPerson> for UserResponse {
    fn from(row: UserWithPerson) -> Self {
        let full_name = row.full_name();
        Self {
            id: row.user.id,
            username: row.user.username,
            person_id: row.user.person_id,
            full_name,
            role: row.user.role,
            is_active: row.user.is_active,
            created_at: row.user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 1,
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
            person_id: 1,
            role: UserRole::Staff,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut u = user();
        UpdateUserRequest {
            is_active: Some(false),
            ..Default::default()
        }
        .merge_into(&mut u);
        assert!(!u.is_active);
        assert_eq!(u.role, UserRole::Staff);
        assert_eq!(u.password_hash, "hash");
    }

    #[test]
    fn test_short_password_is_invalid() {
        let request = CreateUserRequest {
            username: "recepcion".to_string(),
            password: "123".to_string(),
            person_id: 1,
            role: None,
            is_active: None,
        };
        assert!(request.validate().is_err());
    }
}
