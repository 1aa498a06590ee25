pub mod appointment_repository;
pub mod hospitalization_repository;
pub mod medical_record_repository;
pub mod notification_repository;
pub mod person_repository;
pub mod pet_repository;
pub mod species_repository;
pub mod species_vaccination_plan_repository;
pub mod surgical_consent_repository;
pub mod treatment_repository;
pub mod user_repository;
pub mod vaccination_plan_repository;
pub mod vaccination_record_repository;
