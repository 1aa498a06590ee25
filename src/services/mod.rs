//! Services module
//!
//! Este módulo contiene la lógica de negocio: verificación de existencia,
//! reglas de negocio entre entidades y transiciones de estado.

pub mod appointment_service;
pub mod auth_service;
pub mod hospitalization_service;
pub mod medical_record_service;
pub mod notification_service;
pub mod person_service;
pub mod pet_service;
pub mod species_service;
pub mod species_vaccination_plan_service;
pub mod surgical_consent_service;
pub mod treatment_service;
pub mod user_service;
pub mod vaccination_plan_service;
pub mod vaccination_record_service;
pub mod vaccination_schedule;
