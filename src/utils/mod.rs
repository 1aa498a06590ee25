//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT, paginación, filtros dinámicos y archivos subidos.

pub mod errors;
pub mod jwt;
pub mod pagination;
pub mod query;
pub mod uploads;
pub mod validation;
