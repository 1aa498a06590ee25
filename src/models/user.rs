//! Modelo de User
//!
//! Credenciales de acceso; cada usuario pertenece a una persona.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

db_enum! {
    UserRole {
        Admin => "admin",
        Staff => "staff",
        Cliente => "cliente",
    }
}

/// Nunca se serializa: contiene el hash de la contraseña.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub person_id: i32,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Usuario junto con el nombre de su persona, para login y listados
#[derive(Debug, Clone, FromRow)]
pub struct UserWithPerson {
    #[sqlx(flatten)]
    pub user: User,
    pub first_name: String,
    pub last_name: String,
}

impl UserWithPerson {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
