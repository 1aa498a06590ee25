//! Modelo de Person
//!
//! Clientes (dueños de mascotas) y personal de la clínica.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

db_enum! {
    /// Rol de la persona dentro de la clínica
    PersonRole {
        Cliente => "cliente",
        Staff => "staff",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Person {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub document: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: PersonRole,
    pub created_at: DateTime<Utc>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_staff(&self) -> bool {
        self.role == PersonRole::Staff
    }
}
