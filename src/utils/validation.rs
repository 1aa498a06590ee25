//! Utilidades de validación
//!
//! Validadores personalizados usados por los DTOs (`#[validate(custom = ...)]`)
//! y chequeos de invariantes que cruzan varios campos.

use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use regex::Regex;
use validator::ValidationError;

use crate::utils::errors::AppError;

lazy_static! {
    /// Teléfono: dígitos con prefijo internacional opcional, espacios o guiones.
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 \-]{5,18}[0-9]$").unwrap();

    /// Documento de identidad: alfanumérico, 5 a 20 caracteres.
    pub static ref DOCUMENT_REGEX: Regex = Regex::new(r"^[A-Za-z0-9\-]{5,20}$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que una fecha de nacimiento no esté en el futuro
pub fn validate_past_date(value: &NaiveDate) -> Result<(), ValidationError> {
    if *value > Utc::now().date_naive() {
        let mut error = ValidationError::new("past_date");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Pesos y medidas: estrictamente positivos
pub fn validate_positive_decimal(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || value.is_zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Verifica que `end` no sea anterior a `start`.
pub fn ensure_date_order(start: NaiveDate, end: Option<NaiveDate>, what: &str) -> Result<(), AppError> {
    match end {
        Some(end) if end < start => Err(AppError::BadRequest(format!(
            "La fecha de fin de {} no puede ser anterior a la fecha de inicio",
            what
        ))),
        _ => Ok(()),
    }
}

/// Igual que [`ensure_date_order`] pero para marcas de tiempo.
pub fn ensure_datetime_order(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    what: &str,
) -> Result<(), AppError> {
    match end {
        Some(end) if end < start => Err(AppError::BadRequest(format!(
            "La fecha de fin de {} no puede ser anterior a la fecha de inicio",
            what
        ))),
        _ => Ok(()),
    }
}

/// Agrega una línea con marca de tiempo a un campo de notas acumulativo.
pub fn append_note(notes: &mut Option<String>, at: DateTime<Utc>, line: &str) {
    let entry = format!("[{}] {}", at.format("%Y-%m-%d %H:%M"), line);
    match notes {
        Some(existing) if !existing.is_empty() => {
            existing.push('\n');
            existing.push_str(&entry);
        }
        _ => *notes = Some(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("+51 987 654 321"));
        assert!(PHONE_REGEX.is_match("987-654-321"));
        assert!(!PHONE_REGEX.is_match("abc123"));
        assert!(!PHONE_REGEX.is_match("12"));
    }

    #[test]
    fn test_document_regex() {
        assert!(DOCUMENT_REGEX.is_match("12345678"));
        assert!(DOCUMENT_REGEX.is_match("X-1234567"));
        assert!(!DOCUMENT_REGEX.is_match("12 34"));
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Firulais").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_positive_decimal() {
        assert!(validate_positive_decimal(&Decimal::new(125, 1)).is_ok());
        assert!(validate_positive_decimal(&Decimal::ZERO).is_err());
        assert!(validate_positive_decimal(&Decimal::new(-3, 0)).is_err());
    }

    #[test]
    fn test_ensure_date_order() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(ensure_date_order(start, None, "tratamiento").is_ok());
        assert!(ensure_date_order(start, Some(start), "tratamiento").is_ok());
        let before = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert!(matches!(
            ensure_date_order(start, Some(before), "tratamiento"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_append_note() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let mut notes = None;
        append_note(&mut notes, at, "Primera");
        assert_eq!(notes.as_deref(), Some("[2024-05-01 09:30] Primera"));

        append_note(&mut notes, at, "Segunda");
        assert_eq!(
            notes.as_deref(),
            Some("[2024-05-01 09:30] Primera\n[2024-05-01 09:30] Segunda")
        );
    }
}
