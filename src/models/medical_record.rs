use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MedicalRecord {
    pub id: i32,
    pub pet_id: i32,
    pub veterinarian_id: i32,
    pub appointment_id: Option<i32>,
    pub visit_date: DateTime<Utc>,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub observations: Option<String>,
    pub weight: Option<Decimal>,
    /// Temperatura en °C
    pub temperature: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}
