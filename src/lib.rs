//! Backend de la clínica veterinaria
//!
//! API REST sobre PostgreSQL: personas, mascotas, citas, historias clínicas,
//! hospitalizaciones, consentimientos quirúrgicos, notificaciones y planes
//! de vacunación.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
