pub mod appointment_dto;
pub mod auth_dto;
pub mod common_dto;
pub mod hospitalization_dto;
pub mod medical_record_dto;
pub mod notification_dto;
pub mod person_dto;
pub mod pet_dto;
pub mod species_dto;
pub mod surgical_consent_dto;
pub mod treatment_dto;
pub mod user_dto;
pub mod vaccination_dto;
