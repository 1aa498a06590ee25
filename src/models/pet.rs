//! Modelo de Pet
//!
//! Registro de mascotas y sus imágenes.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

db_enum! {
    PetSex {
        Macho => "macho",
        Hembra => "hembra",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Pet {
    pub id: i32,
    pub name: String,
    pub species_id: i32,
    pub breed: Option<String>,
    #[sqlx(try_from = "String")]
    pub sex: PetSex,
    pub birth_date: Option<NaiveDate>,
    /// Edad en meses
    pub age: Option<i32>,
    /// Peso en kilogramos
    pub weight: Option<Decimal>,
    pub color: Option<String>,
    pub microchip: Option<String>,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Pet {
    /// Edad en meses usada para programar vacunas; 0 si no se registró.
    pub fn age_in_months(&self) -> i32 {
        self.age.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PetImage {
    pub id: i32,
    pub pet_id: i32,
    pub url: String,
    pub is_main: bool,
    pub created_at: DateTime<Utc>,
}
