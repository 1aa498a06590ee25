use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Species {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}
