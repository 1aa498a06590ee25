use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{UserRole, UserWithPerson};

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "El usuario es requerido"))]
    pub username: String,
    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,
}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: i32,
    pub username: String,
    pub person_id: i32,
    pub full_name: String,
    pub role: UserRole,
}

impl From<&UserWithPerson> for LoginUser {
    fn from(row: &UserWithPerson) -> Self {
        Self {
            id: row.user.id,
            username: row.user.username.clone(),
            person_id: row.user.person_id,
            full_name: row.full_name(),
            role: row.user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::User;
    use chrono::Utc;

    #[test]
    fn test_login_user_is_camel_case() {
        let row = UserWithPerson {
            user: User {
                id: 3,
                username: "recepcion".to_string(),
                password_hash: "x".to_string(),
                person_id: 9,
                role: UserRole::Staff,
                is_active: true,
                created_at: Utc::now(),
            },
            first_name: "Ana".to_string(),
            last_name: "Quispe".to_string(),
        };

        let json = serde_json::to_value(LoginUser::from(&row)).unwrap();
        assert_eq!(json["personId"], 9);
        assert_eq!(json["fullName"], "Ana Quispe");
        assert_eq!(json["role"], "staff");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_login_request_requires_fields() {
        let request = LoginRequest {
            username: String::new(),
            password: "secreto".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
